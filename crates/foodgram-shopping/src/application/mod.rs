//! Application layer for the Shopping list context.

pub mod query_handlers;
