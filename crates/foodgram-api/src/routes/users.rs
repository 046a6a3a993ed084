//! Routes for the Users bounded context: accounts and subscriptions.

use axum::extract::{OriginalUri, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use foodgram_users::application::command_handlers::{
    handle_register_user, handle_set_password, handle_subscribe, handle_unsubscribe,
};
use foodgram_users::application::query_handlers::{
    CreatedUserView, SubscriptionView, UserView, current_user, get_user, list_subscriptions,
    list_users, subscription_view,
};
use foodgram_users::domain::commands::{RegisterUser, SetPassword, Subscribe, Unsubscribe};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::{CurrentUser, viewer_id};
use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::pagination::{PageParams, Paginated};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct RegisterRequest {
    email: String,
    username: String,
    first_name: String,
    last_name: String,
    password: String,
}

#[derive(Debug, Deserialize)]
struct SetPasswordRequest {
    current_password: String,
    new_password: String,
}

#[derive(Debug, Default, Deserialize)]
struct SubscriptionParams {
    page: Option<u32>,
    limit: Option<u32>,
    recipes_limit: Option<i64>,
}

impl SubscriptionParams {
    fn recipes_limit(&self, state: &AppState) -> i64 {
        self.recipes_limit
            .unwrap_or(state.settings.recipes_limit)
            .max(0)
    }
}

/// GET /api/users/
async fn list(
    State(state): State<AppState>,
    user: Option<CurrentUser>,
    OriginalUri(uri): OriginalUri,
    ApiQuery(params): ApiQuery<PageParams>,
) -> Result<Json<Paginated<UserView>>, ApiError> {
    let page = list_users(
        viewer_id(user.as_ref()),
        params.request(&state.settings),
        state.users.as_ref(),
        state.subscriptions.as_ref(),
    )
    .await?;
    Ok(Json(Paginated::from_page(page, &state.settings.public_url, &uri)?))
}

/// POST /api/users/
async fn register(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<CreatedUserView>), ApiError> {
    let command = RegisterUser {
        correlation_id: Uuid::new_v4(),
        email: body.email,
        username: body.username,
        first_name: body.first_name,
        last_name: body.last_name,
        password: body.password,
    };
    let user = handle_register_user(&command, state.clock.as_ref(), state.users.as_ref()).await?;
    Ok((StatusCode::CREATED, Json(CreatedUserView::from(&user))))
}

/// GET /api/users/{id}/
async fn retrieve(
    State(state): State<AppState>,
    user: Option<CurrentUser>,
    ApiPath(user_id): ApiPath<i64>,
) -> Result<Json<UserView>, ApiError> {
    let view = get_user(
        user_id,
        viewer_id(user.as_ref()),
        state.users.as_ref(),
        state.subscriptions.as_ref(),
    )
    .await?;
    Ok(Json(view))
}

/// GET /api/users/me/
async fn me(user: CurrentUser) -> Json<UserView> {
    Json(current_user(&user.user))
}

/// POST /api/users/set_password/
async fn set_password(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiJson(body): ApiJson<SetPasswordRequest>,
) -> Result<StatusCode, ApiError> {
    let command = SetPassword {
        correlation_id: Uuid::new_v4(),
        user_id: user.id(),
        current_password: body.current_password,
        new_password: body.new_password,
    };
    handle_set_password(&command, state.users.as_ref()).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/users/subscriptions/
async fn subscriptions(
    State(state): State<AppState>,
    user: CurrentUser,
    OriginalUri(uri): OriginalUri,
    ApiQuery(params): ApiQuery<SubscriptionParams>,
) -> Result<Json<Paginated<SubscriptionView>>, ApiError> {
    let page_params = PageParams {
        page: params.page,
        limit: params.limit,
    };
    let page = list_subscriptions(
        user.id(),
        page_params.request(&state.settings),
        Some(params.recipes_limit(&state)),
        state.subscriptions.as_ref(),
        state.recipes.as_ref(),
        state.images.as_ref(),
    )
    .await?;
    Ok(Json(Paginated::from_page(page, &state.settings.public_url, &uri)?))
}

/// POST /api/users/{id}/subscribe/
async fn subscribe(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath(author_id): ApiPath<i64>,
    ApiQuery(params): ApiQuery<SubscriptionParams>,
) -> Result<(StatusCode, Json<SubscriptionView>), ApiError> {
    let command = Subscribe {
        correlation_id: Uuid::new_v4(),
        user_id: user.id(),
        author_id,
    };
    let author = handle_subscribe(&command, state.users.as_ref(), state.subscriptions.as_ref())
        .await?;
    let view = subscription_view(
        &author,
        Some(params.recipes_limit(&state)),
        state.recipes.as_ref(),
        state.images.as_ref(),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// DELETE /api/users/{id}/subscribe/
async fn unsubscribe(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath(author_id): ApiPath<i64>,
) -> Result<StatusCode, ApiError> {
    let command = Unsubscribe {
        correlation_id: Uuid::new_v4(),
        user_id: user.id(),
        author_id,
    };
    handle_unsubscribe(&command, state.users.as_ref(), state.subscriptions.as_ref()).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Returns the router for the users context.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users/", get(list).post(register))
        .route("/users/me/", get(me))
        .route("/users/set_password/", post(set_password))
        .route("/users/subscriptions/", get(subscriptions))
        .route("/users/{id}/", get(retrieve))
        .route("/users/{id}/subscribe/", post(subscribe).delete(unsubscribe))
}
