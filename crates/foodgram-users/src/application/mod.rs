//! Application layer for the Users context.

pub mod command_handlers;
pub mod query_handlers;
