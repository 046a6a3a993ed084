//! Foodgram: Users bounded context.
//!
//! Responsible for account registration, password management, token
//! authentication and follower → author subscriptions.

pub mod application;
pub mod domain;
