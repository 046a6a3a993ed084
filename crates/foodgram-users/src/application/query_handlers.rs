//! Query handlers for the Users context.
//!
//! Read-only view DTOs for users, the authenticated caller and the authors a
//! user follows.

use foodgram_core::error::DomainError;
use foodgram_core::pagination::{Page, PageRequest};
use foodgram_core::repository::{
    ImageStore, RecipeRecord, RecipeRepository, SubscriptionRepository, TokenRepository,
    UserRecord, UserRepository,
};
use serde::Serialize;

use crate::domain::token::token_digest;

/// Public view of a user as seen by a (possibly anonymous) viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserView {
    pub email: String,
    pub id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    /// Whether the viewer follows this user.
    pub is_subscribed: bool,
}

impl UserView {
    fn new(user: &UserRecord, is_subscribed: bool) -> Self {
        Self {
            email: user.email.clone(),
            id: user.id,
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            is_subscribed,
        }
    }
}

/// Response body of a successful registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedUserView {
    pub email: String,
    pub id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<&UserRecord> for CreatedUserView {
    fn from(user: &UserRecord) -> Self {
        Self {
            email: user.email.clone(),
            id: user.id,
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
        }
    }
}

/// Compact recipe representation used in subscriptions and collections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipeSummaryView {
    pub id: i64,
    pub name: String,
    /// Absolute image URL.
    pub image: String,
    pub cooking_time: i32,
}

impl RecipeSummaryView {
    /// Builds the summary, resolving the image path to a public URL.
    #[must_use]
    pub fn new(recipe: &RecipeRecord, images: &dyn ImageStore) -> Self {
        Self {
            id: recipe.id,
            name: recipe.name.clone(),
            image: images.public_url(&recipe.image),
            cooking_time: recipe.cooking_time,
        }
    }
}

/// A followed author together with their newest recipes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubscriptionView {
    #[serde(flatten)]
    pub author: UserView,
    pub recipes: Vec<RecipeSummaryView>,
    /// Total number of recipes by the author, ignoring `recipes_limit`.
    pub recipes_count: i64,
}

/// Builds user views for `viewer`, resolving `is_subscribed` in one lookup.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the subscription lookup fails.
pub async fn user_views(
    users: &[UserRecord],
    viewer: Option<i64>,
    subscriptions: &dyn SubscriptionRepository,
) -> Result<Vec<UserView>, DomainError> {
    let followed = match viewer {
        Some(viewer) => {
            let ids: Vec<i64> = users.iter().map(|user| user.id).collect();
            subscriptions.subscribed_author_ids(viewer, &ids).await?
        }
        None => Vec::new(),
    };
    Ok(users
        .iter()
        .map(|user| UserView::new(user, followed.contains(&user.id)))
        .collect())
}

/// Builds a single user view for `viewer`.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the subscription lookup fails.
pub async fn user_view(
    user: &UserRecord,
    viewer: Option<i64>,
    subscriptions: &dyn SubscriptionRepository,
) -> Result<UserView, DomainError> {
    let mut views = user_views(std::slice::from_ref(user), viewer, subscriptions).await?;
    Ok(views.pop().unwrap_or_else(|| UserView::new(user, false)))
}

/// Retrieves a user profile.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if no user has the id.
pub async fn get_user(
    user_id: i64,
    viewer: Option<i64>,
    users: &dyn UserRepository,
    subscriptions: &dyn SubscriptionRepository,
) -> Result<UserView, DomainError> {
    let user = users
        .find_user(user_id)
        .await?
        .ok_or(DomainError::not_found("user", user_id))?;
    user_view(&user, viewer, subscriptions).await
}

/// Lists users ordered by username.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if a lookup fails.
pub async fn list_users(
    viewer: Option<i64>,
    page: PageRequest,
    users: &dyn UserRepository,
    subscriptions: &dyn SubscriptionRepository,
) -> Result<Page<UserView>, DomainError> {
    let records = users.list_users(page).await?;
    let views = user_views(&records.items, viewer, subscriptions).await?;
    Ok(Page::new(views, records.total, records.request))
}

/// View of the authenticated caller. Nobody can follow themselves.
#[must_use]
pub fn current_user(user: &UserRecord) -> UserView {
    UserView::new(user, false)
}

/// Resolves the owner of a presented token key.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the lookup fails.
pub async fn authenticate(
    token: &str,
    tokens: &dyn TokenRepository,
) -> Result<Option<UserRecord>, DomainError> {
    tokens.find_user_by_token(&token_digest(token)).await
}

/// Builds the subscription view of `author` with at most `recipes_limit`
/// recipes.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if a lookup fails.
pub async fn subscription_view(
    author: &UserRecord,
    recipes_limit: Option<i64>,
    recipes: &dyn RecipeRepository,
    images: &dyn ImageStore,
) -> Result<SubscriptionView, DomainError> {
    let newest = recipes.recipes_by_author(author.id, recipes_limit).await?;
    let recipes_count = recipes.count_recipes_by_author(author.id).await?;
    Ok(SubscriptionView {
        author: UserView::new(author, true),
        recipes: newest
            .iter()
            .map(|recipe| RecipeSummaryView::new(recipe, images))
            .collect(),
        recipes_count,
    })
}

/// Lists the authors `user_id` follows, newest subscription first.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if a lookup fails.
pub async fn list_subscriptions(
    user_id: i64,
    page: PageRequest,
    recipes_limit: Option<i64>,
    subscriptions: &dyn SubscriptionRepository,
    recipes: &dyn RecipeRepository,
    images: &dyn ImageStore,
) -> Result<Page<SubscriptionView>, DomainError> {
    let authors = subscriptions.list_subscriptions(user_id, page).await?;
    let mut views = Vec::with_capacity(authors.items.len());
    for author in &authors.items {
        views.push(subscription_view(author, recipes_limit, recipes, images).await?);
    }
    Ok(Page::new(views, authors.total, authors.request))
}
