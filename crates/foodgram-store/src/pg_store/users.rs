//! Users, tokens and subscriptions.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use foodgram_core::error::DomainError;
use foodgram_core::pagination::{Page, PageRequest};
use foodgram_core::repository::{
    NewUserRecord, SubscriptionRepository, TokenRepository, UserRecord, UserRepository,
};
use sqlx::FromRow;

use super::{PgStore, infra, is_unique_violation, violated_constraint};

const USER_COLUMNS: &str =
    "u.id, u.email, u.username, u.first_name, u.last_name, u.password, u.date_joined";

#[derive(FromRow)]
struct UserRow {
    id: i64,
    email: String,
    username: String,
    first_name: String,
    last_name: String,
    password: String,
    date_joined: DateTime<Utc>,
}

impl From<UserRow> for UserRecord {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            email: row.email,
            username: row.username,
            first_name: row.first_name,
            last_name: row.last_name,
            password_hash: row.password,
            date_joined: row.date_joined,
        }
    }
}

impl PgStore {
    async fn user_where(
        &self,
        condition: &str,
        value: &str,
    ) -> Result<Option<UserRecord>, DomainError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users u WHERE {condition} = $1");
        let row: Option<UserRow> = sqlx::query_as(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(infra)?;
        Ok(row.map(UserRecord::from))
    }
}

#[async_trait]
impl UserRepository for PgStore {
    async fn insert_user(&self, user: NewUserRecord) -> Result<UserRecord, DomainError> {
        let sql = format!(
            "INSERT INTO users AS u (email, username, first_name, last_name, password, date_joined) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {USER_COLUMNS}"
        );
        let result: Result<UserRow, sqlx::Error> = sqlx::query_as(&sql)
            .bind(&user.email)
            .bind(&user.username)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(&user.password_hash)
            .bind(user.date_joined)
            .fetch_one(&self.pool)
            .await;
        match result {
            Ok(row) => Ok(row.into()),
            Err(error) if is_unique_violation(&error) => {
                let field = match violated_constraint(&error) {
                    Some(name) if name.contains("email") => "email",
                    _ => "username",
                };
                Err(DomainError::validation(format!(
                    "{field}: a user with that {field} already exists"
                )))
            }
            Err(error) => Err(infra(error)),
        }
    }

    async fn find_user(&self, id: i64) -> Result<Option<UserRecord>, DomainError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users u WHERE u.id = $1");
        let row: Option<UserRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(infra)?;
        Ok(row.map(UserRecord::from))
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, DomainError> {
        self.user_where("u.email", email).await
    }

    async fn find_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserRecord>, DomainError> {
        self.user_where("u.username", username).await
    }

    async fn list_users(&self, page: PageRequest) -> Result<Page<UserRecord>, DomainError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(infra)?;
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users u ORDER BY u.username LIMIT $1 OFFSET $2"
        );
        let rows: Vec<UserRow> = sqlx::query_as(&sql)
            .bind(page.limit_i64())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(infra)?;
        Ok(Page::new(
            rows.into_iter().map(UserRecord::from).collect(),
            total,
            page,
        ))
    }

    async fn update_password(&self, user_id: i64, password_hash: &str) -> Result<(), DomainError> {
        let result = sqlx::query("UPDATE users SET password = $1 WHERE id = $2")
            .bind(password_hash)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(infra)?;
        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("user", user_id));
        }
        Ok(())
    }
}

#[async_trait]
impl TokenRepository for PgStore {
    async fn insert_token(
        &self,
        user_id: i64,
        digest: &str,
        created_at: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        sqlx::query("INSERT INTO auth_tokens (digest, user_id, created_at) VALUES ($1, $2, $3)")
            .bind(digest)
            .bind(user_id)
            .bind(created_at)
            .execute(&self.pool)
            .await
            .map_err(infra)?;
        Ok(())
    }

    async fn find_user_by_token(&self, digest: &str) -> Result<Option<UserRecord>, DomainError> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM auth_tokens t JOIN users u ON u.id = t.user_id \
             WHERE t.digest = $1"
        );
        let row: Option<UserRow> = sqlx::query_as(&sql)
            .bind(digest)
            .fetch_optional(&self.pool)
            .await
            .map_err(infra)?;
        Ok(row.map(UserRecord::from))
    }

    async fn delete_token(&self, digest: &str) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM auth_tokens WHERE digest = $1")
            .bind(digest)
            .execute(&self.pool)
            .await
            .map_err(infra)?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl SubscriptionRepository for PgStore {
    async fn subscribe(&self, user_id: i64, author_id: i64) -> Result<bool, DomainError> {
        let result = sqlx::query(
            "INSERT INTO subscriptions (user_id, author_id) VALUES ($1, $2) \
             ON CONFLICT (user_id, author_id) DO NOTHING",
        )
        .bind(user_id)
        .bind(author_id)
        .execute(&self.pool)
        .await
        .map_err(infra)?;
        Ok(result.rows_affected() > 0)
    }

    async fn unsubscribe(&self, user_id: i64, author_id: i64) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM subscriptions WHERE user_id = $1 AND author_id = $2")
            .bind(user_id)
            .bind(author_id)
            .execute(&self.pool)
            .await
            .map_err(infra)?;
        Ok(result.rows_affected() > 0)
    }

    async fn subscribed_author_ids(
        &self,
        user_id: i64,
        author_ids: &[i64],
    ) -> Result<Vec<i64>, DomainError> {
        if author_ids.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_scalar(
            "SELECT author_id FROM subscriptions WHERE user_id = $1 AND author_id = ANY($2)",
        )
        .bind(user_id)
        .bind(author_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(infra)
    }

    async fn list_subscriptions(
        &self,
        user_id: i64,
        page: PageRequest,
    ) -> Result<Page<UserRecord>, DomainError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM subscriptions WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(infra)?;
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM subscriptions s JOIN users u ON u.id = s.author_id \
             WHERE s.user_id = $1 ORDER BY s.id DESC LIMIT $2 OFFSET $3"
        );
        let rows: Vec<UserRow> = sqlx::query_as(&sql)
            .bind(user_id)
            .bind(page.limit_i64())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(infra)?;
        Ok(Page::new(
            rows.into_iter().map(UserRecord::from).collect(),
            total,
            page,
        ))
    }
}
