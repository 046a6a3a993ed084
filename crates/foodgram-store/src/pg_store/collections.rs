//! Favorites, shopping cart and the cart ingredient scan.

use async_trait::async_trait;
use foodgram_core::error::DomainError;
use foodgram_core::repository::{
    CartIngredientRecord, CartRepository, RecipeCollection, RecipeCollectionRepository,
};
use sqlx::FromRow;

use super::{PgStore, infra};

fn table(collection: RecipeCollection) -> &'static str {
    match collection {
        RecipeCollection::Favorites => "favorites",
        RecipeCollection::ShoppingCart => "shopping_cart",
    }
}

#[derive(FromRow)]
struct CartIngredientRow {
    recipe_id: i64,
    name: String,
    measurement_unit: String,
    amount: i64,
}

#[async_trait]
impl RecipeCollectionRepository for PgStore {
    async fn add_to_collection(
        &self,
        collection: RecipeCollection,
        user_id: i64,
        recipe_id: i64,
    ) -> Result<bool, DomainError> {
        let sql = format!(
            "INSERT INTO {} (user_id, recipe_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
            table(collection)
        );
        let result = sqlx::query(&sql)
            .bind(user_id)
            .bind(recipe_id)
            .execute(&self.pool)
            .await
            .map_err(infra)?;
        Ok(result.rows_affected() > 0)
    }

    async fn remove_from_collection(
        &self,
        collection: RecipeCollection,
        user_id: i64,
        recipe_id: i64,
    ) -> Result<bool, DomainError> {
        let sql = format!(
            "DELETE FROM {} WHERE user_id = $1 AND recipe_id = $2",
            table(collection)
        );
        let result = sqlx::query(&sql)
            .bind(user_id)
            .bind(recipe_id)
            .execute(&self.pool)
            .await
            .map_err(infra)?;
        Ok(result.rows_affected() > 0)
    }

    async fn collected_recipe_ids(
        &self,
        collection: RecipeCollection,
        user_id: i64,
        recipe_ids: &[i64],
    ) -> Result<Vec<i64>, DomainError> {
        if recipe_ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT recipe_id FROM {} WHERE user_id = $1 AND recipe_id = ANY($2)",
            table(collection)
        );
        sqlx::query_scalar(&sql)
            .bind(user_id)
            .bind(recipe_ids)
            .fetch_all(&self.pool)
            .await
            .map_err(infra)
    }

    async fn count_collectors(
        &self,
        collection: RecipeCollection,
        recipe_id: i64,
    ) -> Result<i64, DomainError> {
        let sql = format!(
            "SELECT COUNT(*) FROM {} WHERE recipe_id = $1",
            table(collection)
        );
        sqlx::query_scalar(&sql)
            .bind(recipe_id)
            .fetch_one(&self.pool)
            .await
            .map_err(infra)
    }
}

#[async_trait]
impl CartRepository for PgStore {
    async fn cart_ingredients(
        &self,
        user_id: i64,
    ) -> Result<Vec<CartIngredientRecord>, DomainError> {
        let rows: Vec<CartIngredientRow> = sqlx::query_as(
            "SELECT c.recipe_id, i.name, i.measurement_unit, ri.amount::BIGINT AS amount \
             FROM shopping_cart c \
             JOIN recipe_ingredients ri ON ri.recipe_id = c.recipe_id \
             JOIN ingredients i ON i.id = ri.ingredient_id \
             WHERE c.user_id = $1",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(infra)?;
        Ok(rows
            .into_iter()
            .map(|row| CartIngredientRecord {
                recipe_id: row.recipe_id,
                name: row.name,
                measurement_unit: row.measurement_unit,
                amount: row.amount,
            })
            .collect())
    }
}
