//! Recipe persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::catalog::TagRecord;
use crate::error::DomainError;
use crate::pagination::{Page, PageRequest};

/// Stored recipe row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeRecord {
    /// Primary key.
    pub id: i64,
    /// Owning user.
    pub author_id: i64,
    /// Recipe title.
    pub name: String,
    /// Image path relative to the media root.
    pub image: String,
    /// Cooking instructions.
    pub text: String,
    /// Cooking time in minutes.
    pub cooking_time: i32,
    /// Publication time.
    pub pub_date: DateTime<Utc>,
}

/// One ingredient line of a recipe, joined with the ingredient catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeIngredientRecord {
    /// Ingredient id.
    pub ingredient_id: i64,
    /// Ingredient name.
    pub name: String,
    /// Ingredient unit.
    pub measurement_unit: String,
    /// Amount in `measurement_unit`.
    pub amount: i32,
}

/// A recipe together with its tags and ingredient lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeDetailsRecord {
    /// The recipe row.
    pub recipe: RecipeRecord,
    /// Tags ordered by id.
    pub tags: Vec<TagRecord>,
    /// Ingredient lines in insertion order.
    pub ingredients: Vec<RecipeIngredientRecord>,
}

/// Ingredient id and amount as written to a recipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct IngredientAmount {
    /// Ingredient id.
    pub ingredient_id: i64,
    /// Amount, at least 1.
    pub amount: i32,
}

/// Full set of writable recipe fields. Used for both inserts and updates;
/// on update `author_id` and `pub_date` are ignored.
#[derive(Debug, Clone)]
pub struct RecipeWrite {
    /// Owning user.
    pub author_id: i64,
    /// Recipe title.
    pub name: String,
    /// Image path relative to the media root.
    pub image: String,
    /// Cooking instructions.
    pub text: String,
    /// Cooking time in minutes.
    pub cooking_time: i32,
    /// Publication time.
    pub pub_date: DateTime<Utc>,
    /// Tag ids, already validated to exist.
    pub tag_ids: Vec<i64>,
    /// Ingredient lines, already validated to exist.
    pub ingredients: Vec<IngredientAmount>,
}

/// Filters for listing recipes. All present filters must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeQuery {
    /// Only recipes by this author.
    pub author_id: Option<i64>,
    /// Only recipes carrying at least one of these tag slugs.
    pub tag_slugs: Vec<String>,
    /// Only recipes this user has favorited.
    pub favorited_by: Option<i64>,
    /// Only recipes in this user's shopping cart.
    pub in_cart_of: Option<i64>,
}

/// Repository for recipes and their tag / ingredient associations.
#[async_trait]
pub trait RecipeRepository: Send + Sync {
    /// Inserts a recipe with its tags and ingredient lines atomically and
    /// returns the new id.
    async fn insert_recipe(&self, recipe: RecipeWrite) -> Result<i64, DomainError>;

    /// Replaces the recipe fields, tags and ingredient lines atomically.
    async fn update_recipe(&self, id: i64, recipe: RecipeWrite) -> Result<(), DomainError>;

    /// Deletes a recipe. Returns whether it existed.
    async fn delete_recipe(&self, id: i64) -> Result<bool, DomainError>;

    /// Loads a recipe with tags and ingredient lines.
    async fn find_recipe(&self, id: i64) -> Result<Option<RecipeDetailsRecord>, DomainError>;

    /// Lists recipes matching `query`, newest first.
    async fn list_recipes(
        &self,
        query: &RecipeQuery,
        page: PageRequest,
    ) -> Result<Page<RecipeDetailsRecord>, DomainError>;

    /// Number of recipes published by an author.
    async fn count_recipes_by_author(&self, author_id: i64) -> Result<i64, DomainError>;

    /// An author's recipes, newest first, optionally truncated.
    async fn recipes_by_author(
        &self,
        author_id: i64,
        limit: Option<i64>,
    ) -> Result<Vec<RecipeRecord>, DomainError>;
}
