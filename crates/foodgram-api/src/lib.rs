//! Foodgram API: HTTP surface of the recipe backend.
//!
//! Wires the bounded-context handlers to `axum` routes under `/api`, serves
//! uploaded media and exposes the configuration and telemetry setup used by
//! the `foodgram-api` binary.

use std::path::Path;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod pagination;
pub mod routes;
pub mod state;
pub mod telemetry;

#[cfg(test)]
pub(crate) mod testing;

use state::AppState;

/// The `/api` route tree.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .merge(routes::auth::router())
        .merge(routes::users::router())
        .merge(routes::tags::router())
        .merge(routes::ingredients::router())
        .merge(routes::recipes::router())
}

/// Builds the complete application: API, health check, media files and the
/// JSON 404 fallback.
pub fn app(state: AppState, media_root: &Path) -> Router {
    // TODO: Replace CorsLayer::permissive() with the frontend origin once it is configurable.
    Router::new()
        .merge(routes::health::router())
        .nest("/api", api_router())
        .nest_service("/media", ServeDir::new(media_root))
        .fallback(routes::fallback)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
