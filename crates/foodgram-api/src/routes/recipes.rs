//! Routes for the Recipes bounded context, the favorites and shopping cart
//! collections and the shopping list download.

use axum::extract::{OriginalUri, State};
use axum::http::StatusCode;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use foodgram_core::error::DomainError;
use foodgram_core::repository::{IngredientAmount, RecipeCollection};
use foodgram_recipes::application::command_handlers::{
    handle_add_to_collection, handle_create_recipe, handle_delete_recipe,
    handle_remove_from_collection, handle_update_recipe,
};
use foodgram_recipes::application::query_handlers::{
    RecipeFilter, RecipeView, get_recipe, list_recipes,
};
use foodgram_recipes::domain::commands::{
    AddToCollection, CreateRecipe, DeleteRecipe, RemoveFromCollection, UpdateRecipe,
};
use foodgram_shopping::application::query_handlers::download_shopping_list;
use foodgram_users::application::query_handlers::RecipeSummaryView;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::{CurrentUser, viewer_id};
use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::pagination::{PageParams, Paginated};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct IngredientLine {
    id: i64,
    amount: i32,
}

/// Body of recipe create and update requests.
#[derive(Debug, Deserialize)]
struct RecipePayload {
    #[serde(default)]
    ingredients: Vec<IngredientLine>,
    #[serde(default)]
    tags: Vec<i64>,
    image: Option<String>,
    name: String,
    text: String,
    cooking_time: i32,
}

impl RecipePayload {
    fn ingredient_amounts(&self) -> Vec<IngredientAmount> {
        self.ingredients
            .iter()
            .map(|line| IngredientAmount {
                ingredient_id: line.id,
                amount: line.amount,
            })
            .collect()
    }
}

#[derive(Debug, Default, Deserialize)]
struct RecipeListParams {
    page: Option<u32>,
    limit: Option<u32>,
    author: Option<i64>,
    #[serde(default)]
    tags: Vec<String>,
    is_favorited: Option<String>,
    is_in_shopping_cart: Option<String>,
}

/// `1` and `true` switch a boolean filter on.
fn flag(value: Option<&str>) -> bool {
    matches!(value, Some("1" | "true" | "True"))
}

impl RecipeListParams {
    fn filter(&self) -> RecipeFilter {
        RecipeFilter {
            author: self.author,
            tags: self.tags.clone(),
            is_favorited: flag(self.is_favorited.as_deref()),
            is_in_shopping_cart: flag(self.is_in_shopping_cart.as_deref()),
        }
    }
}

async fn recipe_response(
    state: &AppState,
    recipe_id: i64,
    viewer: i64,
) -> Result<Json<RecipeView>, ApiError> {
    let view = get_recipe(
        recipe_id,
        Some(viewer),
        state.recipe_context(),
        &state.favorited_counts,
    )
    .await?;
    Ok(Json(view))
}

/// GET /api/recipes/
async fn list(
    State(state): State<AppState>,
    user: Option<CurrentUser>,
    OriginalUri(uri): OriginalUri,
    ApiQuery(params): ApiQuery<RecipeListParams>,
) -> Result<Json<Paginated<RecipeView>>, ApiError> {
    let page_request = PageParams {
        page: params.page,
        limit: params.limit,
    }
    .request(&state.settings);
    let page = list_recipes(
        viewer_id(user.as_ref()),
        &params.filter(),
        page_request,
        state.recipe_context(),
    )
    .await?;
    Ok(Json(Paginated::from_page(page, &state.settings.public_url, &uri)?))
}

/// POST /api/recipes/
async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiJson(body): ApiJson<RecipePayload>,
) -> Result<(StatusCode, Json<RecipeView>), ApiError> {
    let ingredients = body.ingredient_amounts();
    let image = body
        .image
        .ok_or_else(|| DomainError::validation("image: this field is required"))?;
    let command = CreateRecipe {
        correlation_id: Uuid::new_v4(),
        author_id: user.id(),
        name: body.name,
        image,
        text: body.text,
        cooking_time: body.cooking_time,
        tags: body.tags,
        ingredients,
    };
    let recipe_id = handle_create_recipe(
        &command,
        state.clock.as_ref(),
        state.tags.as_ref(),
        state.ingredients.as_ref(),
        state.recipes.as_ref(),
        state.images.as_ref(),
    )
    .await?;
    let view = recipe_response(&state, recipe_id, user.id()).await?;
    Ok((StatusCode::CREATED, view))
}

/// GET /api/recipes/{id}/
async fn retrieve(
    State(state): State<AppState>,
    user: Option<CurrentUser>,
    ApiPath(recipe_id): ApiPath<i64>,
) -> Result<Json<RecipeView>, ApiError> {
    let view = get_recipe(
        recipe_id,
        viewer_id(user.as_ref()),
        state.recipe_context(),
        &state.favorited_counts,
    )
    .await?;
    Ok(Json(view))
}

/// PATCH /api/recipes/{id}/
async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath(recipe_id): ApiPath<i64>,
    ApiJson(body): ApiJson<RecipePayload>,
) -> Result<Json<RecipeView>, ApiError> {
    let ingredients = body.ingredient_amounts();
    let command = UpdateRecipe {
        correlation_id: Uuid::new_v4(),
        recipe_id,
        user_id: user.id(),
        name: body.name,
        image: body.image,
        text: body.text,
        cooking_time: body.cooking_time,
        tags: body.tags,
        ingredients,
    };
    handle_update_recipe(
        &command,
        state.tags.as_ref(),
        state.ingredients.as_ref(),
        state.recipes.as_ref(),
        state.images.as_ref(),
    )
    .await?;
    recipe_response(&state, recipe_id, user.id()).await
}

/// DELETE /api/recipes/{id}/
async fn destroy(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath(recipe_id): ApiPath<i64>,
) -> Result<StatusCode, ApiError> {
    let command = DeleteRecipe {
        correlation_id: Uuid::new_v4(),
        recipe_id,
        user_id: user.id(),
    };
    handle_delete_recipe(&command, state.recipes.as_ref(), state.images.as_ref()).await?;
    state.favorited_counts.invalidate(&recipe_id);
    Ok(StatusCode::NO_CONTENT)
}

async fn add_to(
    state: &AppState,
    collection: RecipeCollection,
    user: &CurrentUser,
    recipe_id: i64,
) -> Result<(StatusCode, Json<RecipeSummaryView>), ApiError> {
    let command = AddToCollection {
        correlation_id: Uuid::new_v4(),
        collection,
        user_id: user.id(),
        recipe_id,
    };
    let view = handle_add_to_collection(
        &command,
        state.recipes.as_ref(),
        state.collections.as_ref(),
        state.images.as_ref(),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(view)))
}

async fn remove_from(
    state: &AppState,
    collection: RecipeCollection,
    user: &CurrentUser,
    recipe_id: i64,
) -> Result<StatusCode, ApiError> {
    let command = RemoveFromCollection {
        correlation_id: Uuid::new_v4(),
        collection,
        user_id: user.id(),
        recipe_id,
    };
    handle_remove_from_collection(&command, state.recipes.as_ref(), state.collections.as_ref())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/recipes/{id}/favorite/
async fn favorite(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath(recipe_id): ApiPath<i64>,
) -> Result<(StatusCode, Json<RecipeSummaryView>), ApiError> {
    add_to(&state, RecipeCollection::Favorites, &user, recipe_id).await
}

/// DELETE /api/recipes/{id}/favorite/
async fn unfavorite(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath(recipe_id): ApiPath<i64>,
) -> Result<StatusCode, ApiError> {
    remove_from(&state, RecipeCollection::Favorites, &user, recipe_id).await
}

/// POST /api/recipes/{id}/shopping_cart/
async fn add_to_cart(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath(recipe_id): ApiPath<i64>,
) -> Result<(StatusCode, Json<RecipeSummaryView>), ApiError> {
    add_to(&state, RecipeCollection::ShoppingCart, &user, recipe_id).await
}

/// DELETE /api/recipes/{id}/shopping_cart/
async fn remove_from_cart(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath(recipe_id): ApiPath<i64>,
) -> Result<StatusCode, ApiError> {
    remove_from(&state, RecipeCollection::ShoppingCart, &user, recipe_id).await
}

/// GET /api/recipes/download_shopping_cart/
///
/// Responds 204 when the cart holds nothing to buy.
async fn download_shopping_cart(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Response, ApiError> {
    let Some(file) = download_shopping_list(user.id(), state.cart.as_ref()).await? else {
        return Ok(StatusCode::NO_CONTENT.into_response());
    };
    let headers = [
        (CONTENT_TYPE, file.content_type.to_owned()),
        (
            CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", file.file_name),
        ),
    ];
    Ok((StatusCode::OK, headers, file.bytes).into_response())
}

/// Returns the router for recipes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/recipes/", get(list).post(create))
        .route(
            "/recipes/download_shopping_cart/",
            get(download_shopping_cart),
        )
        .route(
            "/recipes/{id}/",
            get(retrieve).patch(update).delete(destroy),
        )
        .route("/recipes/{id}/favorite/", post(favorite).delete(unfavorite))
        .route(
            "/recipes/{id}/shopping_cart/",
            post(add_to_cart).delete(remove_from_cart),
        )
}
