//! Persistence records and repository traits.
//!
//! Records are the storage-shaped rows that repositories read and write.
//! Bounded contexts turn them into their own view types.

mod catalog;
mod collections;
mod media;
mod recipes;
mod users;

pub use catalog::{
    IngredientRecord, IngredientRepository, NewIngredientRecord, TagRecord, TagRepository,
};
pub use collections::{
    CartIngredientRecord, CartRepository, RecipeCollection, RecipeCollectionRepository,
};
pub use media::ImageStore;
pub use recipes::{
    IngredientAmount, RecipeDetailsRecord, RecipeIngredientRecord, RecipeQuery, RecipeRecord,
    RecipeRepository, RecipeWrite,
};
pub use users::{NewUserRecord, SubscriptionRepository, TokenRepository, UserRecord, UserRepository};
