//! Query handlers for the Recipes context.
//!
//! Build read-only view DTOs for tags, ingredients and recipes, resolving
//! viewer-dependent flags (`is_favorited`, `is_in_shopping_cart`,
//! `author.is_subscribed`) in batched lookups.

use std::collections::BTreeMap;

use foodgram_core::cache::TtlCache;
use foodgram_core::error::DomainError;
use foodgram_core::pagination::{Page, PageRequest};
use foodgram_core::repository::{
    ImageStore, IngredientRecord, IngredientRepository, RecipeCollection,
    RecipeCollectionRepository, RecipeDetailsRecord, RecipeQuery, RecipeRepository,
    SubscriptionRepository, TagRecord, TagRepository, UserRepository,
};
use foodgram_users::application::query_handlers::{UserView, user_views};
use serde::Serialize;

/// Cache of "times favorited" counters keyed by recipe id.
pub type FavoritedCountCache = TtlCache<i64, i64>;

/// Repositories needed to assemble recipe views.
#[derive(Clone, Copy)]
pub struct RecipeReadContext<'a> {
    pub recipes: &'a dyn RecipeRepository,
    pub users: &'a dyn UserRepository,
    pub subscriptions: &'a dyn SubscriptionRepository,
    pub collections: &'a dyn RecipeCollectionRepository,
    pub images: &'a dyn ImageStore,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagView {
    pub id: i64,
    pub name: String,
    pub color: String,
    pub slug: String,
}

impl From<&TagRecord> for TagView {
    fn from(tag: &TagRecord) -> Self {
        Self {
            id: tag.id,
            name: tag.name.clone(),
            color: tag.color.clone(),
            slug: tag.slug.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngredientView {
    pub id: i64,
    pub name: String,
    pub measurement_unit: String,
}

impl From<&IngredientRecord> for IngredientView {
    fn from(ingredient: &IngredientRecord) -> Self {
        Self {
            id: ingredient.id,
            name: ingredient.name.clone(),
            measurement_unit: ingredient.measurement_unit.clone(),
        }
    }
}

/// An ingredient line of a recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipeIngredientView {
    /// Ingredient id.
    pub id: i64,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

/// Full view of a recipe as seen by a (possibly anonymous) viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipeView {
    pub id: i64,
    pub author: UserView,
    pub tags: Vec<TagView>,
    pub ingredients: Vec<RecipeIngredientView>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub name: String,
    /// Absolute image URL.
    pub image: String,
    pub text: String,
    pub cooking_time: i32,
    /// Present on single-recipe views only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub favorited_count: Option<i64>,
}

/// Filters accepted by the recipe list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeFilter {
    pub author: Option<i64>,
    /// Tag slugs; a recipe matches if it carries any of them.
    pub tags: Vec<String>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
}

/// Lists all tags ordered by id.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the lookup fails.
pub async fn list_tags(tags: &dyn TagRepository) -> Result<Vec<TagView>, DomainError> {
    Ok(tags.list_tags().await?.iter().map(TagView::from).collect())
}

/// Retrieves a tag.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if no tag has the id.
pub async fn get_tag(tag_id: i64, tags: &dyn TagRepository) -> Result<TagView, DomainError> {
    tags.find_tag(tag_id)
        .await?
        .as_ref()
        .map(TagView::from)
        .ok_or(DomainError::not_found("tag", tag_id))
}

/// Lists ingredients ordered by name, optionally filtered by a
/// case-insensitive name prefix.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the lookup fails.
pub async fn list_ingredients(
    name: Option<&str>,
    ingredients: &dyn IngredientRepository,
) -> Result<Vec<IngredientView>, DomainError> {
    let prefix = name.map(str::trim).filter(|prefix| !prefix.is_empty());
    Ok(ingredients
        .list_ingredients(prefix)
        .await?
        .iter()
        .map(IngredientView::from)
        .collect())
}

/// Retrieves an ingredient.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if no ingredient has the id.
pub async fn get_ingredient(
    ingredient_id: i64,
    ingredients: &dyn IngredientRepository,
) -> Result<IngredientView, DomainError> {
    ingredients
        .find_ingredient(ingredient_id)
        .await?
        .as_ref()
        .map(IngredientView::from)
        .ok_or(DomainError::not_found("ingredient", ingredient_id))
}

/// Number of users who favorited the recipe, read through `cache`.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the count query fails.
pub async fn favorited_count(
    recipe_id: i64,
    cache: &FavoritedCountCache,
    collections: &dyn RecipeCollectionRepository,
) -> Result<i64, DomainError> {
    if let Some(count) = cache.get(&recipe_id) {
        return Ok(count);
    }
    let count = collections
        .count_collectors(RecipeCollection::Favorites, recipe_id)
        .await?;
    cache.set(recipe_id, count);
    Ok(count)
}

/// Builds recipe views for `viewer`.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if a lookup fails, or
/// `DomainError::NotFound` if an author row is missing.
pub async fn recipe_views(
    details: &[RecipeDetailsRecord],
    viewer: Option<i64>,
    ctx: RecipeReadContext<'_>,
) -> Result<Vec<RecipeView>, DomainError> {
    let recipe_ids: Vec<i64> = details.iter().map(|d| d.recipe.id).collect();

    let mut authors = BTreeMap::new();
    for author_id in details.iter().map(|d| d.recipe.author_id) {
        if authors.contains_key(&author_id) {
            continue;
        }
        let author = ctx
            .users
            .find_user(author_id)
            .await?
            .ok_or(DomainError::not_found("user", author_id))?;
        authors.insert(author_id, author);
    }
    let author_records: Vec<_> = authors.into_values().collect();
    let author_views: BTreeMap<i64, UserView> =
        user_views(&author_records, viewer, ctx.subscriptions)
            .await?
            .into_iter()
            .map(|view| (view.id, view))
            .collect();

    let (favorited, in_cart) = match viewer {
        Some(user_id) => (
            ctx.collections
                .collected_recipe_ids(RecipeCollection::Favorites, user_id, &recipe_ids)
                .await?,
            ctx.collections
                .collected_recipe_ids(RecipeCollection::ShoppingCart, user_id, &recipe_ids)
                .await?,
        ),
        None => (Vec::new(), Vec::new()),
    };

    details
        .iter()
        .map(|detail| {
            let recipe = &detail.recipe;
            let author = author_views
                .get(&recipe.author_id)
                .cloned()
                .ok_or(DomainError::not_found("user", recipe.author_id))?;
            Ok(RecipeView {
                id: recipe.id,
                author,
                tags: detail.tags.iter().map(TagView::from).collect(),
                ingredients: detail
                    .ingredients
                    .iter()
                    .map(|line| RecipeIngredientView {
                        id: line.ingredient_id,
                        name: line.name.clone(),
                        measurement_unit: line.measurement_unit.clone(),
                        amount: line.amount,
                    })
                    .collect(),
                is_favorited: favorited.contains(&recipe.id),
                is_in_shopping_cart: in_cart.contains(&recipe.id),
                name: recipe.name.clone(),
                image: ctx.images.public_url(&recipe.image),
                text: recipe.text.clone(),
                cooking_time: recipe.cooking_time,
                favorited_count: None,
            })
        })
        .collect()
}

/// Retrieves a recipe with its favorited count.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if no recipe has the id.
pub async fn get_recipe(
    recipe_id: i64,
    viewer: Option<i64>,
    ctx: RecipeReadContext<'_>,
    cache: &FavoritedCountCache,
) -> Result<RecipeView, DomainError> {
    let details = ctx
        .recipes
        .find_recipe(recipe_id)
        .await?
        .ok_or(DomainError::not_found("recipe", recipe_id))?;
    let mut view = recipe_views(std::slice::from_ref(&details), viewer, ctx)
        .await?
        .pop()
        .ok_or(DomainError::not_found("recipe", recipe_id))?;
    view.favorited_count = Some(favorited_count(recipe_id, cache, ctx.collections).await?);
    Ok(view)
}

/// Lists recipes newest first.
///
/// The `is_favorited` and `is_in_shopping_cart` filters select nothing for
/// anonymous viewers.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if a lookup fails.
pub async fn list_recipes(
    viewer: Option<i64>,
    filter: &RecipeFilter,
    page: PageRequest,
    ctx: RecipeReadContext<'_>,
) -> Result<Page<RecipeView>, DomainError> {
    if viewer.is_none() && (filter.is_favorited || filter.is_in_shopping_cart) {
        return Ok(Page::new(Vec::new(), 0, page));
    }
    let query = RecipeQuery {
        author_id: filter.author,
        tag_slugs: filter.tags.clone(),
        favorited_by: viewer.filter(|_| filter.is_favorited),
        in_cart_of: viewer.filter(|_| filter.is_in_shopping_cart),
    };
    let records = ctx.recipes.list_recipes(&query, page).await?;
    let views = recipe_views(&records.items, viewer, ctx).await?;
    Ok(Page::new(views, records.total, records.request))
}
