//! Domain layer for the Shopping list context.

mod font;
pub mod grocery;
pub mod render;
