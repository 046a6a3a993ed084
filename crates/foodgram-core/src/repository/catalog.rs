//! Tag and ingredient catalog persistence.

use async_trait::async_trait;

use crate::error::DomainError;

/// Stored tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagRecord {
    /// Primary key.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// `#RRGGBB` color.
    pub color: String,
    /// URL slug used by recipe filters.
    pub slug: String,
}

/// Stored ingredient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngredientRecord {
    /// Primary key.
    pub id: i64,
    /// Ingredient name.
    pub name: String,
    /// Unit the ingredient is measured in.
    pub measurement_unit: String,
}

/// An ingredient that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewIngredientRecord {
    /// Ingredient name.
    pub name: String,
    /// Unit the ingredient is measured in.
    pub measurement_unit: String,
}

/// Read access to tags.
#[async_trait]
pub trait TagRepository: Send + Sync {
    /// Lists all tags ordered by id.
    async fn list_tags(&self) -> Result<Vec<TagRecord>, DomainError>;

    /// Looks up a tag by id.
    async fn find_tag(&self, id: i64) -> Result<Option<TagRecord>, DomainError>;

    /// Returns the subset of `ids` that exist.
    async fn existing_tag_ids(&self, ids: &[i64]) -> Result<Vec<i64>, DomainError>;
}

/// Access to the ingredient catalog.
#[async_trait]
pub trait IngredientRepository: Send + Sync {
    /// Lists ingredients ordered by name, optionally restricted to names
    /// starting with `name_prefix` (case-insensitive).
    async fn list_ingredients(
        &self,
        name_prefix: Option<&str>,
    ) -> Result<Vec<IngredientRecord>, DomainError>;

    /// Looks up an ingredient by id.
    async fn find_ingredient(&self, id: i64) -> Result<Option<IngredientRecord>, DomainError>;

    /// Returns the subset of `ids` that exist.
    async fn existing_ingredient_ids(&self, ids: &[i64]) -> Result<Vec<i64>, DomainError>;

    /// Inserts ingredients, skipping `(name, measurement_unit)` pairs that
    /// already exist. Returns the number of inserted rows.
    async fn insert_ingredients(
        &self,
        ingredients: &[NewIngredientRecord],
    ) -> Result<u64, DomainError>;
}
