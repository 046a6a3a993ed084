//! Per-user recipe collections: favorites and the shopping cart.

use async_trait::async_trait;

use crate::error::DomainError;

/// A per-user set of recipes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecipeCollection {
    /// Recipes the user marked as favorite.
    Favorites,
    /// Recipes the user intends to shop for.
    ShoppingCart,
}

impl RecipeCollection {
    /// Human-readable name used in messages.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Favorites => "favorites",
            Self::ShoppingCart => "shopping cart",
        }
    }
}

/// Membership of recipes in user collections.
#[async_trait]
pub trait RecipeCollectionRepository: Send + Sync {
    /// Adds a recipe. Returns `false` if it was already present.
    async fn add_to_collection(
        &self,
        collection: RecipeCollection,
        user_id: i64,
        recipe_id: i64,
    ) -> Result<bool, DomainError>;

    /// Removes a recipe. Returns `false` if it was not present.
    async fn remove_from_collection(
        &self,
        collection: RecipeCollection,
        user_id: i64,
        recipe_id: i64,
    ) -> Result<bool, DomainError>;

    /// Returns the subset of `recipe_ids` present in the user's collection.
    async fn collected_recipe_ids(
        &self,
        collection: RecipeCollection,
        user_id: i64,
        recipe_ids: &[i64],
    ) -> Result<Vec<i64>, DomainError>;

    /// Number of users holding the recipe in the collection.
    async fn count_collectors(
        &self,
        collection: RecipeCollection,
        recipe_id: i64,
    ) -> Result<i64, DomainError>;
}

/// One ingredient line of a recipe that sits in a user's shopping cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartIngredientRecord {
    /// Recipe the line belongs to.
    pub recipe_id: i64,
    /// Ingredient name.
    pub name: String,
    /// Ingredient unit.
    pub measurement_unit: String,
    /// Amount for this recipe.
    pub amount: i64,
}

/// Read access to the ingredient lines of a user's cart.
#[async_trait]
pub trait CartRepository: Send + Sync {
    /// Every ingredient line of every recipe in the user's cart, unaggregated
    /// and in no particular order.
    async fn cart_ingredients(&self, user_id: i64)
    -> Result<Vec<CartIngredientRecord>, DomainError>;
}
