//! `PostgreSQL` implementation of the repository ports.
//!
//! One [`PgStore`] serves every trait; the impls are split by concern into
//! submodules. Queries are checked at runtime so the crate builds without a
//! live database.

mod catalog;
mod collections;
mod recipes;
mod users;

use foodgram_core::error::DomainError;
use sqlx::PgPool;

/// PostgreSQL-backed store.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Creates a new `PgStore`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Maps a driver error to an infrastructure error.
fn infra(error: sqlx::Error) -> DomainError {
    DomainError::Infrastructure(format!("database error: {error}"))
}

/// Whether the error is a unique-constraint violation.
fn is_unique_violation(error: &sqlx::Error) -> bool {
    matches!(error, sqlx::Error::Database(db) if db.is_unique_violation())
}

/// Name of the violated constraint, if the database reported one.
fn violated_constraint(error: &sqlx::Error) -> Option<&str> {
    match error {
        sqlx::Error::Database(db) => db.constraint(),
        _ => None,
    }
}
