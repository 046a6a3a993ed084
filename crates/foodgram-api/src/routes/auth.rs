//! Routes for obtaining and revoking authentication tokens.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use foodgram_users::application::command_handlers::{handle_obtain_token, handle_revoke_token};
use foodgram_users::domain::commands::{ObtainToken, RevokeToken};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Debug, Serialize)]
struct TokenResponse {
    auth_token: String,
}

/// POST /api/auth/token/login/
async fn login(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let command = ObtainToken {
        correlation_id: Uuid::new_v4(),
        email: body.email,
        password: body.password,
    };
    let auth_token = handle_obtain_token(
        &command,
        state.clock.as_ref(),
        state.users.as_ref(),
        state.tokens.as_ref(),
    )
    .await?;
    Ok(Json(TokenResponse { auth_token }))
}

/// POST /api/auth/token/logout/
async fn logout(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<StatusCode, ApiError> {
    let command = RevokeToken {
        correlation_id: Uuid::new_v4(),
        token: user.token,
    };
    handle_revoke_token(&command, state.tokens.as_ref()).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Returns the router for token authentication.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/token/login/", post(login))
        .route("/auth/token/logout/", post(logout))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::testing::TestApp;

    #[tokio::test]
    async fn test_login_then_logout_revokes_the_token() {
        // Arrange
        let app = TestApp::new();
        app.register("ada").await;

        // Act
        let (status, body) = app
            .post(
                "/api/auth/token/login/",
                None,
                &json!({"email": "ada@example.com", "password": "Str0ngPass!"}),
            )
            .await;
        let token = body["auth_token"].as_str().unwrap().to_owned();
        let (logout_status, _) = app.post("/api/auth/token/logout/", Some(&token), &json!({})).await;
        let (after_status, _) = app.get("/api/users/me/", Some(&token)).await;

        // Assert
        assert_eq!(status, StatusCode::OK);
        assert_eq!(token.len(), 40);
        assert_eq!(logout_status, StatusCode::NO_CONTENT);
        assert_eq!(after_status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_login_with_wrong_password_is_rejected() {
        let app = TestApp::new();
        app.register("ada").await;

        let (status, body) = app
            .post(
                "/api/auth/token/login/",
                None,
                &json!({"email": "ada@example.com", "password": "wrong-password"}),
            )
            .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid_credentials");
    }

    #[tokio::test]
    async fn test_logout_requires_authentication() {
        let app = TestApp::new();

        let (status, body) = app.post("/api/auth/token/logout/", None, &json!({})).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "not_authenticated");
    }
}
