//! Application layer for the Recipes context.

pub mod command_handlers;
pub mod query_handlers;
