//! Foodgram: Shopping list context.
//!
//! Turns the recipes in a user's shopping cart into one consolidated list of
//! groceries and renders it as a printable PDF.

pub mod application;
pub mod domain;
