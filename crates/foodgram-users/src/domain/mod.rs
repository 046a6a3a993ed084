//! Domain layer for the Users context.

pub mod commands;
pub mod password;
pub mod token;
pub mod validation;
