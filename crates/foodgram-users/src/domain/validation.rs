//! Field validators shared by user commands.

use std::borrow::Cow;

use validator::ValidationError;

/// Usernames that would collide with fixed routes.
const RESERVED_USERNAMES: &[&str] = &["me"];

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::from(message));
    error
}

/// Letters, digits and `.@+-_` only; reserved names are rejected.
///
/// # Errors
///
/// Returns a `ValidationError` describing the rejected username.
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if RESERVED_USERNAMES.contains(&username.to_lowercase().as_str()) {
        return Err(invalid("reserved_username", "this username is reserved"));
    }
    let allowed = username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '.' | '@' | '+' | '-' | '_'));
    if allowed {
        Ok(())
    } else {
        Err(invalid(
            "invalid_username",
            "may contain only letters, digits and .@+-_ characters",
        ))
    }
}

/// Rejects passwords made only of digits or only of whitespace.
///
/// # Errors
///
/// Returns a `ValidationError` describing the weak password.
pub fn validate_password_strength(password: &str) -> Result<(), ValidationError> {
    if password.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid("numeric_password", "password is entirely numeric"));
    }
    if password.trim().is_empty() {
        return Err(invalid("blank_password", "password must not be blank"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_accepts_word_characters() {
        assert!(validate_username("cook.master+1@home-kitchen_2").is_ok());
        assert!(validate_username("повар").is_ok());
    }

    #[test]
    fn test_username_rejects_spaces_and_reserved_names() {
        assert!(validate_username("two words").is_err());
        assert!(validate_username("bad/slash").is_err());
        assert_eq!(validate_username("Me").unwrap_err().code, "reserved_username");
    }

    #[test]
    fn test_password_strength() {
        assert!(validate_password_strength("pas$W0rd").is_ok());
        assert!(validate_password_strength("12345678").is_err());
        assert!(validate_password_strength("        ").is_err());
    }
}
