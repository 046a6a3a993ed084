//! Token authentication extractors.
//!
//! Requests authenticate with `Authorization: Token <key>`. A header that is
//! present but malformed or unknown is rejected with 401 on every endpoint,
//! including the public ones.

use axum::extract::{FromRequestParts, OptionalFromRequestParts};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use foodgram_core::error::DomainError;
use foodgram_core::repository::UserRecord;
use foodgram_users::application::query_handlers::authenticate;
use foodgram_users::domain::token::parse_authorization;

use crate::error::ApiError;
use crate::state::AppState;

/// The authenticated caller and the token key they presented.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: UserRecord,
    pub token: String,
}

impl CurrentUser {
    /// The caller's user id.
    #[must_use]
    pub fn id(&self) -> i64 {
        self.user.id
    }
}

async fn resolve(parts: &Parts, state: &AppState) -> Result<Option<CurrentUser>, ApiError> {
    let Some(header) = parts.headers.get(AUTHORIZATION) else {
        return Ok(None);
    };
    let key = header
        .to_str()
        .ok()
        .and_then(parse_authorization)
        .ok_or(DomainError::Unauthenticated)?;
    let user = authenticate(key, state.tokens.as_ref())
        .await?
        .ok_or(DomainError::Unauthenticated)?;
    Ok(Some(CurrentUser {
        user,
        token: key.to_owned(),
    }))
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        resolve(parts, state)
            .await?
            .ok_or(ApiError(DomainError::Unauthenticated))
    }
}

impl OptionalFromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Option<Self>, Self::Rejection> {
        resolve(parts, state).await
    }
}

/// Id of the caller, if any, for endpoints that also serve anonymous users.
#[must_use]
pub fn viewer_id(user: Option<&CurrentUser>) -> Option<i64> {
    user.map(CurrentUser::id)
}
