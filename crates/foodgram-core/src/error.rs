//! Domain error types.

use thiserror::Error;

/// Top-level domain error type.
#[derive(Debug, Error)]
pub enum DomainError {
    /// A requested entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of entity that was looked up (`"recipe"`, `"user"`, ...).
        entity: &'static str,
        /// Identifier used for the lookup.
        id: i64,
    },

    /// Input failed domain validation.
    #[error("validation error: {0}")]
    Validation(String),

    /// The operation needs an authenticated user.
    #[error("authentication credentials were not provided or are invalid")]
    Unauthenticated,

    /// Login attempt with an unknown email or a wrong password.
    #[error("unable to log in with provided credentials")]
    InvalidCredentials,

    /// The authenticated user may not perform the operation.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// An infrastructure/persistence error.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}

impl DomainError {
    /// Shorthand for [`DomainError::NotFound`].
    #[must_use]
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        Self::NotFound { entity, id }
    }

    /// Shorthand for [`DomainError::Validation`].
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

impl From<validator::ValidationErrors> for DomainError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .iter()
            .map(|(field, field_errors)| {
                let message = field_errors
                    .first()
                    .and_then(|e| e.message.as_ref())
                    .map_or_else(|| "is invalid".to_owned(), ToString::to_string);
                format!("{field}: {message}")
            })
            .collect();
        if messages.is_empty() {
            return Self::Validation(errors.to_string());
        }
        messages.sort();
        Self::Validation(messages.join("; "))
    }
}
