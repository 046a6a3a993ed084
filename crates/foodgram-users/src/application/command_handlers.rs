//! Command handlers for the Users context.
//!
//! Handlers validate the command, apply the domain rules and persist the
//! result through the repository ports.

use foodgram_core::clock::Clock;
use foodgram_core::command::Command;
use foodgram_core::error::DomainError;
use foodgram_core::repository::{
    NewUserRecord, SubscriptionRepository, TokenRepository, UserRecord, UserRepository,
};
use tracing::{info, instrument};
use validator::Validate;

use crate::domain::commands::{
    ObtainToken, RegisterUser, RevokeToken, SetPassword, Subscribe, Unsubscribe,
};
use crate::domain::password::{hash_password, verify_password};
use crate::domain::token::{generate_token, token_digest};

/// Handles the `RegisterUser` command: validates the fields, hashes the
/// password and stores the account.
///
/// # Errors
///
/// Returns `DomainError::Validation` for invalid fields or a taken email or
/// username, `DomainError::Infrastructure` if persistence fails.
#[instrument(skip_all, fields(correlation_id = %command.correlation_id))]
pub async fn handle_register_user(
    command: &RegisterUser,
    clock: &dyn Clock,
    users: &dyn UserRepository,
) -> Result<UserRecord, DomainError> {
    command.validate()?;

    if users.find_user_by_email(&command.email).await?.is_some() {
        return Err(DomainError::validation(
            "email: a user with that email already exists",
        ));
    }
    if users.find_user_by_username(&command.username).await?.is_some() {
        return Err(DomainError::validation(
            "username: a user with that username already exists",
        ));
    }

    let user = users
        .insert_user(NewUserRecord {
            email: command.email.clone(),
            username: command.username.clone(),
            first_name: command.first_name.clone(),
            last_name: command.last_name.clone(),
            password_hash: hash_password(&command.password)?,
            date_joined: clock.now(),
        })
        .await?;

    info!(
        command = command.command_type(),
        user_id = user.id,
        "user registered"
    );
    Ok(user)
}

/// Handles the `SetPassword` command.
///
/// # Errors
///
/// Returns `DomainError::Validation` if the current password does not match
/// or the new one is too weak, `DomainError::NotFound` if the user vanished.
#[instrument(skip_all, fields(correlation_id = %command.correlation_id, user_id = command.user_id))]
pub async fn handle_set_password(
    command: &SetPassword,
    users: &dyn UserRepository,
) -> Result<(), DomainError> {
    let user = users
        .find_user(command.user_id)
        .await?
        .ok_or(DomainError::not_found("user", command.user_id))?;

    if !verify_password(&command.current_password, &user.password_hash) {
        return Err(DomainError::validation(
            "current_password: the current password is incorrect",
        ));
    }
    command.validate()?;

    users
        .update_password(user.id, &hash_password(&command.new_password)?)
        .await?;

    info!(command = command.command_type(), "password changed");
    Ok(())
}

/// Handles the `ObtainToken` command and returns the new token key.
///
/// The key is returned to the caller once; only its digest is stored.
///
/// # Errors
///
/// Returns `DomainError::InvalidCredentials` for an unknown email or a wrong
/// password.
#[instrument(skip_all, fields(correlation_id = %command.correlation_id))]
pub async fn handle_obtain_token(
    command: &ObtainToken,
    clock: &dyn Clock,
    users: &dyn UserRepository,
    tokens: &dyn TokenRepository,
) -> Result<String, DomainError> {
    let user = users
        .find_user_by_email(&command.email)
        .await?
        .filter(|user| verify_password(&command.password, &user.password_hash))
        .ok_or(DomainError::InvalidCredentials)?;

    let key = generate_token();
    tokens
        .insert_token(user.id, &token_digest(&key), clock.now())
        .await?;

    info!(
        command = command.command_type(),
        user_id = user.id,
        "token issued"
    );
    Ok(key)
}

/// Handles the `RevokeToken` command.
///
/// # Errors
///
/// Returns `DomainError::Unauthenticated` if the token is not known.
#[instrument(skip_all, fields(correlation_id = %command.correlation_id))]
pub async fn handle_revoke_token(
    command: &RevokeToken,
    tokens: &dyn TokenRepository,
) -> Result<(), DomainError> {
    if !tokens.delete_token(&token_digest(&command.token)).await? {
        return Err(DomainError::Unauthenticated);
    }
    info!(command = command.command_type(), "token revoked");
    Ok(())
}

/// Handles the `Subscribe` command and returns the followed author.
///
/// # Errors
///
/// Returns `DomainError::NotFound` for an unknown author and
/// `DomainError::Validation` when following oneself or following twice.
#[instrument(skip_all, fields(correlation_id = %command.correlation_id, author_id = command.author_id))]
pub async fn handle_subscribe(
    command: &Subscribe,
    users: &dyn UserRepository,
    subscriptions: &dyn SubscriptionRepository,
) -> Result<UserRecord, DomainError> {
    let author = users
        .find_user(command.author_id)
        .await?
        .ok_or(DomainError::not_found("user", command.author_id))?;

    if author.id == command.user_id {
        return Err(DomainError::validation("you cannot subscribe to yourself"));
    }
    if !subscriptions.subscribe(command.user_id, author.id).await? {
        return Err(DomainError::validation(format!(
            "you are already subscribed to {}",
            author.username
        )));
    }

    info!(
        command = command.command_type(),
        user_id = command.user_id,
        "subscribed"
    );
    Ok(author)
}

/// Handles the `Unsubscribe` command.
///
/// # Errors
///
/// Returns `DomainError::NotFound` for an unknown author or a missing
/// subscription.
#[instrument(skip_all, fields(correlation_id = %command.correlation_id, author_id = command.author_id))]
pub async fn handle_unsubscribe(
    command: &Unsubscribe,
    users: &dyn UserRepository,
    subscriptions: &dyn SubscriptionRepository,
) -> Result<(), DomainError> {
    if users.find_user(command.author_id).await?.is_none() {
        return Err(DomainError::not_found("user", command.author_id));
    }
    if !subscriptions
        .unsubscribe(command.user_id, command.author_id)
        .await?
    {
        return Err(DomainError::not_found("subscription", command.author_id));
    }

    info!(
        command = command.command_type(),
        user_id = command.user_id,
        "unsubscribed"
    );
    Ok(())
}
