//! Tags and ingredients.

use async_trait::async_trait;
use foodgram_core::error::DomainError;
use foodgram_core::repository::{
    IngredientRecord, IngredientRepository, NewIngredientRecord, TagRecord, TagRepository,
};
use sqlx::FromRow;

use super::{PgStore, infra};

#[derive(FromRow)]
pub(super) struct TagRow {
    pub(super) id: i64,
    pub(super) name: String,
    pub(super) color: String,
    pub(super) slug: String,
}

impl From<TagRow> for TagRecord {
    fn from(row: TagRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            color: row.color,
            slug: row.slug,
        }
    }
}

#[derive(FromRow)]
struct IngredientRow {
    id: i64,
    name: String,
    measurement_unit: String,
}

impl From<IngredientRow> for IngredientRecord {
    fn from(row: IngredientRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            measurement_unit: row.measurement_unit,
        }
    }
}

/// `LIKE` pattern matching names that start with `prefix`, case-insensitively.
fn prefix_pattern(prefix: &str) -> String {
    let mut pattern = String::with_capacity(prefix.len() + 1);
    for c in prefix.to_lowercase().chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[async_trait]
impl TagRepository for PgStore {
    async fn list_tags(&self) -> Result<Vec<TagRecord>, DomainError> {
        let rows: Vec<TagRow> = sqlx::query_as("SELECT id, name, color, slug FROM tags ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(infra)?;
        Ok(rows.into_iter().map(TagRecord::from).collect())
    }

    async fn find_tag(&self, id: i64) -> Result<Option<TagRecord>, DomainError> {
        let row: Option<TagRow> =
            sqlx::query_as("SELECT id, name, color, slug FROM tags WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(infra)?;
        Ok(row.map(TagRecord::from))
    }

    async fn existing_tag_ids(&self, ids: &[i64]) -> Result<Vec<i64>, DomainError> {
        sqlx::query_scalar("SELECT id FROM tags WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await
            .map_err(infra)
    }
}

#[async_trait]
impl IngredientRepository for PgStore {
    async fn list_ingredients(
        &self,
        name_prefix: Option<&str>,
    ) -> Result<Vec<IngredientRecord>, DomainError> {
        let pattern = name_prefix.map(prefix_pattern);
        let rows: Vec<IngredientRow> = sqlx::query_as(
            "SELECT id, name, measurement_unit FROM ingredients \
             WHERE $1::TEXT IS NULL OR LOWER(name) LIKE $1 \
             ORDER BY name, id",
        )
        .bind(pattern)
        .fetch_all(&self.pool)
        .await
        .map_err(infra)?;
        Ok(rows.into_iter().map(IngredientRecord::from).collect())
    }

    async fn find_ingredient(&self, id: i64) -> Result<Option<IngredientRecord>, DomainError> {
        let row: Option<IngredientRow> =
            sqlx::query_as("SELECT id, name, measurement_unit FROM ingredients WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(infra)?;
        Ok(row.map(IngredientRecord::from))
    }

    async fn existing_ingredient_ids(&self, ids: &[i64]) -> Result<Vec<i64>, DomainError> {
        sqlx::query_scalar("SELECT id FROM ingredients WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await
            .map_err(infra)
    }

    async fn insert_ingredients(
        &self,
        ingredients: &[NewIngredientRecord],
    ) -> Result<u64, DomainError> {
        if ingredients.is_empty() {
            return Ok(0);
        }
        let names: Vec<String> = ingredients.iter().map(|i| i.name.clone()).collect();
        let units: Vec<String> = ingredients
            .iter()
            .map(|i| i.measurement_unit.clone())
            .collect();
        let result = sqlx::query(
            "INSERT INTO ingredients (name, measurement_unit) \
             SELECT * FROM UNNEST($1::TEXT[], $2::TEXT[]) \
             ON CONFLICT (name, measurement_unit) DO NOTHING",
        )
        .bind(names)
        .bind(units)
        .execute(&self.pool)
        .await
        .map_err(infra)?;
        Ok(result.rows_affected())
    }
}
