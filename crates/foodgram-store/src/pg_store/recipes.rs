//! Recipes with their tags and ingredient lines.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use foodgram_core::error::DomainError;
use foodgram_core::pagination::{Page, PageRequest};
use foodgram_core::repository::{
    RecipeDetailsRecord, RecipeIngredientRecord, RecipeQuery, RecipeRecord, RecipeRepository,
    RecipeWrite, TagRecord,
};
use sqlx::{FromRow, PgConnection, Postgres, QueryBuilder};

use super::catalog::TagRow;
use super::{PgStore, infra};

const RECIPE_COLUMNS: &str = "r.id, r.author_id, r.name, r.image, r.text, r.cooking_time, r.pub_date";

#[derive(FromRow)]
struct RecipeRow {
    id: i64,
    author_id: i64,
    name: String,
    image: String,
    text: String,
    cooking_time: i32,
    pub_date: DateTime<Utc>,
}

impl From<RecipeRow> for RecipeRecord {
    fn from(row: RecipeRow) -> Self {
        Self {
            id: row.id,
            author_id: row.author_id,
            name: row.name,
            image: row.image,
            text: row.text,
            cooking_time: row.cooking_time,
            pub_date: row.pub_date,
        }
    }
}

#[derive(FromRow)]
struct RecipeTagRow {
    recipe_id: i64,
    #[sqlx(flatten)]
    tag: TagRow,
}

#[derive(FromRow)]
struct RecipeIngredientRow {
    recipe_id: i64,
    ingredient_id: i64,
    name: String,
    measurement_unit: String,
    amount: i32,
}

/// Appends the `WHERE` clause for a recipe query on alias `r`.
fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, query: &RecipeQuery) {
    builder.push(" WHERE TRUE");
    if let Some(author_id) = query.author_id {
        builder.push(" AND r.author_id = ").push_bind(author_id);
    }
    if !query.tag_slugs.is_empty() {
        builder
            .push(
                " AND EXISTS (SELECT 1 FROM recipe_tags rt JOIN tags t ON t.id = rt.tag_id \
                 WHERE rt.recipe_id = r.id AND t.slug = ANY(",
            )
            .push_bind(query.tag_slugs.clone())
            .push("))");
    }
    if let Some(user_id) = query.favorited_by {
        builder
            .push(" AND EXISTS (SELECT 1 FROM favorites f WHERE f.recipe_id = r.id AND f.user_id = ")
            .push_bind(user_id)
            .push(")");
    }
    if let Some(user_id) = query.in_cart_of {
        builder
            .push(
                " AND EXISTS (SELECT 1 FROM shopping_cart c WHERE c.recipe_id = r.id AND c.user_id = ",
            )
            .push_bind(user_id)
            .push(")");
    }
}

/// Writes the tag links and ingredient lines of a recipe.
async fn insert_links(
    conn: &mut PgConnection,
    recipe_id: i64,
    recipe: &RecipeWrite,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO recipe_tags (recipe_id, tag_id) SELECT $1, UNNEST($2::BIGINT[])",
    )
    .bind(recipe_id)
    .bind(&recipe.tag_ids)
    .execute(&mut *conn)
    .await?;

    let ingredient_ids: Vec<i64> = recipe.ingredients.iter().map(|l| l.ingredient_id).collect();
    let amounts: Vec<i32> = recipe.ingredients.iter().map(|l| l.amount).collect();
    sqlx::query(
        "INSERT INTO recipe_ingredients (recipe_id, ingredient_id, amount) \
         SELECT $1, i, a FROM UNNEST($2::BIGINT[], $3::INTEGER[]) AS lines(i, a)",
    )
    .bind(recipe_id)
    .bind(ingredient_ids)
    .bind(amounts)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

impl PgStore {
    /// Loads tags and ingredient lines for `rows`, preserving their order.
    async fn with_details(
        &self,
        rows: Vec<RecipeRow>,
    ) -> Result<Vec<RecipeDetailsRecord>, DomainError> {
        let ids: Vec<i64> = rows.iter().map(|row| row.id).collect();

        let tag_rows: Vec<RecipeTagRow> = sqlx::query_as(
            "SELECT rt.recipe_id, t.id, t.name, t.color, t.slug \
             FROM recipe_tags rt JOIN tags t ON t.id = rt.tag_id \
             WHERE rt.recipe_id = ANY($1) ORDER BY t.id",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(infra)?;
        let mut tags: HashMap<i64, Vec<TagRecord>> = HashMap::new();
        for row in tag_rows {
            tags.entry(row.recipe_id).or_default().push(row.tag.into());
        }

        let ingredient_rows: Vec<RecipeIngredientRow> = sqlx::query_as(
            "SELECT ri.recipe_id, ri.ingredient_id, i.name, i.measurement_unit, ri.amount \
             FROM recipe_ingredients ri JOIN ingredients i ON i.id = ri.ingredient_id \
             WHERE ri.recipe_id = ANY($1) ORDER BY ri.id",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(infra)?;
        let mut ingredients: HashMap<i64, Vec<RecipeIngredientRecord>> = HashMap::new();
        for row in ingredient_rows {
            ingredients
                .entry(row.recipe_id)
                .or_default()
                .push(RecipeIngredientRecord {
                    ingredient_id: row.ingredient_id,
                    name: row.name,
                    measurement_unit: row.measurement_unit,
                    amount: row.amount,
                });
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let id = row.id;
                RecipeDetailsRecord {
                    recipe: row.into(),
                    tags: tags.remove(&id).unwrap_or_default(),
                    ingredients: ingredients.remove(&id).unwrap_or_default(),
                }
            })
            .collect())
    }
}

#[async_trait]
impl RecipeRepository for PgStore {
    async fn insert_recipe(&self, recipe: RecipeWrite) -> Result<i64, DomainError> {
        let mut tx = self.pool.begin().await.map_err(infra)?;
        let recipe_id: i64 = sqlx::query_scalar(
            "INSERT INTO recipes (author_id, name, image, text, cooking_time, pub_date) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING id",
        )
        .bind(recipe.author_id)
        .bind(&recipe.name)
        .bind(&recipe.image)
        .bind(&recipe.text)
        .bind(recipe.cooking_time)
        .bind(recipe.pub_date)
        .fetch_one(&mut *tx)
        .await
        .map_err(infra)?;
        insert_links(&mut tx, recipe_id, &recipe)
            .await
            .map_err(infra)?;
        tx.commit().await.map_err(infra)?;
        Ok(recipe_id)
    }

    async fn update_recipe(&self, id: i64, recipe: RecipeWrite) -> Result<(), DomainError> {
        let mut tx = self.pool.begin().await.map_err(infra)?;
        let updated = sqlx::query(
            "UPDATE recipes SET name = $1, image = $2, text = $3, cooking_time = $4 WHERE id = $5",
        )
        .bind(&recipe.name)
        .bind(&recipe.image)
        .bind(&recipe.text)
        .bind(recipe.cooking_time)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(infra)?;
        if updated.rows_affected() == 0 {
            return Err(DomainError::not_found("recipe", id));
        }
        sqlx::query("DELETE FROM recipe_tags WHERE recipe_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(infra)?;
        sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(infra)?;
        insert_links(&mut tx, id, &recipe).await.map_err(infra)?;
        tx.commit().await.map_err(infra)?;
        Ok(())
    }

    async fn delete_recipe(&self, id: i64) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM recipes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(infra)?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_recipe(&self, id: i64) -> Result<Option<RecipeDetailsRecord>, DomainError> {
        let sql = format!("SELECT {RECIPE_COLUMNS} FROM recipes r WHERE r.id = $1");
        let row: Option<RecipeRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(infra)?;
        match row {
            Some(row) => Ok(self.with_details(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn list_recipes(
        &self,
        query: &RecipeQuery,
        page: PageRequest,
    ) -> Result<Page<RecipeDetailsRecord>, DomainError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM recipes r");
        push_filters(&mut count, query);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(infra)?;

        let mut select = QueryBuilder::<Postgres>::new(format!(
            "SELECT {RECIPE_COLUMNS} FROM recipes r"
        ));
        push_filters(&mut select, query);
        select
            .push(" ORDER BY r.pub_date DESC, r.id DESC LIMIT ")
            .push_bind(page.limit_i64())
            .push(" OFFSET ")
            .push_bind(page.offset());
        let rows: Vec<RecipeRow> = select
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(infra)?;

        Ok(Page::new(self.with_details(rows).await?, total, page))
    }

    async fn count_recipes_by_author(&self, author_id: i64) -> Result<i64, DomainError> {
        sqlx::query_scalar("SELECT COUNT(*) FROM recipes WHERE author_id = $1")
            .bind(author_id)
            .fetch_one(&self.pool)
            .await
            .map_err(infra)
    }

    async fn recipes_by_author(
        &self,
        author_id: i64,
        limit: Option<i64>,
    ) -> Result<Vec<RecipeRecord>, DomainError> {
        let sql = format!(
            "SELECT {RECIPE_COLUMNS} FROM recipes r WHERE r.author_id = $1 \
             ORDER BY r.pub_date DESC, r.id DESC LIMIT $2"
        );
        let rows: Vec<RecipeRow> = sqlx::query_as(&sql)
            .bind(author_id)
            .bind(limit.map(|limit| limit.max(0)))
            .fetch_all(&self.pool)
            .await
            .map_err(infra)?;
        Ok(rows.into_iter().map(RecipeRecord::from).collect())
    }
}
