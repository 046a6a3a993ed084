//! Foodgram: Recipes bounded context.
//!
//! Responsible for the tag and ingredient catalog, recipe publishing, the
//! per-user favorites and shopping cart collections, and ingredient import.

pub mod application;
pub mod domain;
