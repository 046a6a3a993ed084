//! User, token and subscription persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::DomainError;
use crate::pagination::{Page, PageRequest};

/// Stored representation of a user account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    /// Primary key.
    pub id: i64,
    /// Unique login email.
    pub email: String,
    /// Unique public handle.
    pub username: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Argon2 PHC string.
    pub password_hash: String,
    /// Registration time.
    pub date_joined: DateTime<Utc>,
}

/// A user account that has not been persisted yet.
#[derive(Debug, Clone)]
pub struct NewUserRecord {
    /// Unique login email.
    pub email: String,
    /// Unique public handle.
    pub username: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Argon2 PHC string.
    pub password_hash: String,
    /// Registration time.
    pub date_joined: DateTime<Utc>,
}

/// Repository for user accounts.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Inserts a user. A duplicate email or username yields
    /// `DomainError::Validation`.
    async fn insert_user(&self, user: NewUserRecord) -> Result<UserRecord, DomainError>;

    /// Looks up a user by id.
    async fn find_user(&self, id: i64) -> Result<Option<UserRecord>, DomainError>;

    /// Looks up a user by email (exact match).
    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, DomainError>;

    /// Looks up a user by username (exact match).
    async fn find_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserRecord>, DomainError>;

    /// Lists users ordered by username.
    async fn list_users(&self, page: PageRequest) -> Result<Page<UserRecord>, DomainError>;

    /// Replaces the stored password hash.
    async fn update_password(&self, user_id: i64, password_hash: &str) -> Result<(), DomainError>;
}

/// Repository for authentication tokens. Only token digests are stored.
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// Stores a token digest for a user.
    async fn insert_token(
        &self,
        user_id: i64,
        digest: &str,
        created_at: DateTime<Utc>,
    ) -> Result<(), DomainError>;

    /// Resolves the user owning a token digest.
    async fn find_user_by_token(&self, digest: &str) -> Result<Option<UserRecord>, DomainError>;

    /// Deletes a token. Returns whether a token was removed.
    async fn delete_token(&self, digest: &str) -> Result<bool, DomainError>;
}

/// Repository for follower → author subscriptions.
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Creates a subscription. Returns `false` if it already existed.
    async fn subscribe(&self, user_id: i64, author_id: i64) -> Result<bool, DomainError>;

    /// Deletes a subscription. Returns `false` if none existed.
    async fn unsubscribe(&self, user_id: i64, author_id: i64) -> Result<bool, DomainError>;

    /// Returns the subset of `author_ids` that `user_id` follows.
    async fn subscribed_author_ids(
        &self,
        user_id: i64,
        author_ids: &[i64],
    ) -> Result<Vec<i64>, DomainError>;

    /// Lists the authors `user_id` follows, newest subscription first.
    async fn list_subscriptions(
        &self,
        user_id: i64,
        page: PageRequest,
    ) -> Result<Page<UserRecord>, DomainError>;
}
