//! Routes for the tag catalog.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use foodgram_recipes::application::query_handlers::{TagView, get_tag, list_tags};

use crate::error::ApiError;
use crate::extract::ApiPath;
use crate::state::AppState;

/// GET /api/tags/
async fn list(State(state): State<AppState>) -> Result<Json<Vec<TagView>>, ApiError> {
    Ok(Json(list_tags(state.tags.as_ref()).await?))
}

/// GET /api/tags/{id}/
async fn retrieve(
    State(state): State<AppState>,
    ApiPath(tag_id): ApiPath<i64>,
) -> Result<Json<TagView>, ApiError> {
    Ok(Json(get_tag(tag_id, state.tags.as_ref()).await?))
}

/// Returns the router for tags.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/tags/", get(list))
        .route("/tags/{id}/", get(retrieve))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use crate::testing::TestApp;

    #[tokio::test]
    async fn test_tags_are_listed_without_pagination() {
        // Arrange
        let app = TestApp::new();
        app.store.add_tag("Breakfast", "#E26C2D", "breakfast");
        app.store.add_tag("Dinner", "#8775D2", "dinner");

        // Act
        let (status, body) = app.get("/api/tags/", None).await;

        // Assert
        assert_eq!(status, StatusCode::OK);
        let tags = body.as_array().unwrap();
        assert_eq!(tags.len(), 2);
        assert_eq!(tags[0]["slug"], "breakfast");
        assert_eq!(tags[1]["color"], "#8775D2");
    }

    #[tokio::test]
    async fn test_unknown_tag_is_not_found() {
        let app = TestApp::new();
        let tag = app.store.add_tag("Lunch", "#49B64E", "lunch");

        let (found, body) = app.get(&format!("/api/tags/{}/", tag.id), None).await;
        let (missing, _) = app.get("/api/tags/404/", None).await;

        assert_eq!(found, StatusCode::OK);
        assert_eq!(body["name"], "Lunch");
        assert_eq!(missing, StatusCode::NOT_FOUND);
    }
}
