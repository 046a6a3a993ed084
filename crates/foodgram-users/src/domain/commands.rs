//! Commands for the Users context.

use foodgram_core::command::Command;
use uuid::Uuid;
use validator::Validate;

use super::validation::{validate_password_strength, validate_username};

/// Command to register a new account.
#[derive(Debug, Clone, Validate)]
pub struct RegisterUser {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Login email.
    #[validate(
        email(message = "enter a valid email address"),
        length(max = 254, message = "must be at most 254 characters")
    )]
    pub email: String,
    /// Public handle.
    #[validate(
        length(min = 1, max = 150, message = "must be between 1 and 150 characters"),
        custom(function = "validate_username")
    )]
    pub username: String,
    /// Given name.
    #[validate(length(min = 1, max = 150, message = "must be between 1 and 150 characters"))]
    pub first_name: String,
    /// Family name.
    #[validate(length(min = 1, max = 150, message = "must be between 1 and 150 characters"))]
    pub last_name: String,
    /// Plain-text password, hashed before storage.
    #[validate(
        length(min = 8, max = 150, message = "must be between 8 and 150 characters"),
        custom(function = "validate_password_strength")
    )]
    pub password: String,
}

impl Command for RegisterUser {
    fn command_type(&self) -> &'static str {
        "users.register_user"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to change the password of the authenticated user.
#[derive(Debug, Clone, Validate)]
pub struct SetPassword {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The user changing their password.
    pub user_id: i64,
    /// Must match the stored password.
    pub current_password: String,
    /// Replacement password.
    #[validate(
        length(min = 8, max = 150, message = "must be between 8 and 150 characters"),
        custom(function = "validate_password_strength")
    )]
    pub new_password: String,
}

impl Command for SetPassword {
    fn command_type(&self) -> &'static str {
        "users.set_password"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to exchange credentials for an authentication token.
#[derive(Debug, Clone)]
pub struct ObtainToken {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Login email.
    pub email: String,
    /// Plain-text password.
    pub password: String,
}

impl Command for ObtainToken {
    fn command_type(&self) -> &'static str {
        "users.obtain_token"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to revoke the token used for the current request.
#[derive(Debug, Clone)]
pub struct RevokeToken {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The token key as presented by the client.
    pub token: String,
}

impl Command for RevokeToken {
    fn command_type(&self) -> &'static str {
        "users.revoke_token"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to follow an author.
#[derive(Debug, Clone)]
pub struct Subscribe {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The follower.
    pub user_id: i64,
    /// The followed author.
    pub author_id: i64,
}

impl Command for Subscribe {
    fn command_type(&self) -> &'static str {
        "users.subscribe"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to stop following an author.
#[derive(Debug, Clone)]
pub struct Unsubscribe {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The follower.
    pub user_id: i64,
    /// The followed author.
    pub author_id: i64,
}

impl Command for Unsubscribe {
    fn command_type(&self) -> &'static str {
        "users.unsubscribe"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}
