//! Route modules organized by bounded context.

use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::error::ErrorBody;

pub mod auth;
pub mod health;
pub mod ingredients;
pub mod recipes;
pub mod tags;
pub mod users;

/// JSON 404 for unknown routes.
pub async fn fallback() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorBody {
            error: "not_found",
            message: "no route matches the requested path".to_owned(),
        }),
    )
}
