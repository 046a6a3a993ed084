//! Routes for the ingredient catalog.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use foodgram_recipes::application::query_handlers::{
    IngredientView, get_ingredient, list_ingredients,
};
use serde::Deserialize;

use crate::error::ApiError;
use crate::extract::{ApiPath, ApiQuery};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
struct IngredientParams {
    /// Case-insensitive name prefix.
    name: Option<String>,
}

/// GET /api/ingredients/
async fn list(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<IngredientParams>,
) -> Result<Json<Vec<IngredientView>>, ApiError> {
    let views = list_ingredients(params.name.as_deref(), state.ingredients.as_ref()).await?;
    Ok(Json(views))
}

/// GET /api/ingredients/{id}/
async fn retrieve(
    State(state): State<AppState>,
    ApiPath(ingredient_id): ApiPath<i64>,
) -> Result<Json<IngredientView>, ApiError> {
    Ok(Json(
        get_ingredient(ingredient_id, state.ingredients.as_ref()).await?,
    ))
}

/// Returns the router for ingredients.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/ingredients/", get(list))
        .route("/ingredients/{id}/", get(retrieve))
}
