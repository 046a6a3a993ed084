//! Opaque authentication tokens.
//!
//! Clients receive a random 40-character key; only its SHA-256 digest is
//! persisted.

use std::fmt::Write as _;

use rand::Rng;
use rand::distr::Alphanumeric;
use sha2::{Digest, Sha256};

/// Length of issued token keys.
pub const TOKEN_LENGTH: usize = 40;

/// Generates a new random token key.
#[must_use]
pub fn generate_token() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

/// Hex-encoded SHA-256 digest of a token key.
#[must_use]
pub fn token_digest(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    digest.iter().fold(String::with_capacity(64), |mut out, byte| {
        let _ = write!(out, "{byte:02x}");
        out
    })
}

/// Extracts the key from an `Authorization: Token <key>` header value.
#[must_use]
pub fn parse_authorization(header: &str) -> Option<&str> {
    let (scheme, key) = header.trim().split_once(' ')?;
    let key = key.trim();
    (scheme.eq_ignore_ascii_case("token") && !key.is_empty() && !key.contains(' '))
        .then_some(key)
}
