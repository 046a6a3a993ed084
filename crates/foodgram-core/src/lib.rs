//! Foodgram Core: shared domain abstractions.
//!
//! This crate defines the error type, clock, cache, pagination primitives,
//! persistence records and repository traits that every bounded context
//! depends on. It contains no infrastructure code.

pub mod cache;
pub mod clock;
pub mod command;
pub mod error;
pub mod pagination;
pub mod repository;
