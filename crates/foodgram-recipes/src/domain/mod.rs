//! Domain layer for the Recipes context.

pub mod commands;
pub mod import;
pub mod upload;
pub mod validation;
