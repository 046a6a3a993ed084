//! Environment-driven server configuration.

use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::Duration;

use crate::error::AppError;
use crate::state::ApiSettings;

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" | "text" => Ok(Self::Pretty),
            other => Err(format!("unknown log format `{other}`")),
        }
    }
}

/// Settings read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub database_max_connections: u32,
    /// Directory uploaded images are written to.
    pub media_root: PathBuf,
    /// Externally visible base URL, used for image and pagination links.
    pub public_url: String,
    /// Default page size of paginated lists.
    pub page_size: u32,
    /// Default number of recipes embedded in a subscription.
    pub recipes_limit: i64,
    pub favorited_cache_ttl: Duration,
    pub log_format: LogFormat,
    /// OTLP collector endpoint; span export is off when unset.
    pub otel_endpoint: Option<String>,
}

impl Config {
    /// Reads the configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is missing or invalid.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, which maps a variable name
    /// to its value.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is missing or invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let database_url = lookup("DATABASE_URL")
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| {
                AppError::Config("DATABASE_URL environment variable must be set".to_owned())
            })?;

        let page_size: u32 = parse_or(&lookup, "PAGE_SIZE", 6)?;
        if !(1..=100).contains(&page_size) {
            return Err(AppError::Config(
                "PAGE_SIZE must be between 1 and 100".to_owned(),
            ));
        }
        let recipes_limit: i64 = parse_or(&lookup, "RECIPES_LIMIT", 3)?;
        if recipes_limit < 0 {
            return Err(AppError::Config(
                "RECIPES_LIMIT must not be negative".to_owned(),
            ));
        }
        let ttl_seconds: u32 = parse_or(&lookup, "FAVORITED_CACHE_TTL_SECONDS", 60)?;

        Ok(Self {
            database_url,
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_owned()),
            port: parse_or(&lookup, "PORT", 8000)?,
            database_max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 10)?,
            media_root: lookup("MEDIA_ROOT").map_or_else(|| PathBuf::from("media"), PathBuf::from),
            public_url: lookup("PUBLIC_URL")
                .unwrap_or_else(|| "http://localhost:8000".to_owned())
                .trim_end_matches('/')
                .to_owned(),
            page_size,
            recipes_limit,
            favorited_cache_ttl: Duration::seconds(i64::from(ttl_seconds)),
            log_format: parse_or(&lookup, "LOG_FORMAT", LogFormat::Json)?,
            otel_endpoint: lookup("OTEL_EXPORTER_OTLP_ENDPOINT").filter(|e| !e.trim().is_empty()),
        })
    }

    /// The subset of settings request handlers need.
    #[must_use]
    pub fn api_settings(&self) -> ApiSettings {
        ApiSettings {
            public_url: self.public_url.clone(),
            page_size: self.page_size,
            recipes_limit: self.recipes_limit,
        }
    }
}

fn parse_or<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AppError::Config(format!("{key} is invalid: {e}"))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, AppError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_apply_when_only_database_url_is_set() {
        // Act
        let config = config_from(&[("DATABASE_URL", "postgres://localhost/foodgram")]).unwrap();

        // Assert
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8000);
        assert_eq!(config.database_max_connections, 10);
        assert_eq!(config.media_root, PathBuf::from("media"));
        assert_eq!(config.public_url, "http://localhost:8000");
        assert_eq!(config.page_size, 6);
        assert_eq!(config.recipes_limit, 3);
        assert_eq!(config.favorited_cache_ttl, Duration::seconds(60));
        assert_eq!(config.log_format, LogFormat::Json);
        assert!(config.otel_endpoint.is_none());
    }

    #[test]
    fn test_missing_database_url_is_a_config_error() {
        let result = config_from(&[("PORT", "9000")]);

        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_overrides_are_parsed() {
        let config = config_from(&[
            ("DATABASE_URL", "postgres://db/foodgram"),
            ("PORT", "9000"),
            ("PUBLIC_URL", "https://foodgram.example/"),
            ("PAGE_SIZE", "10"),
            ("LOG_FORMAT", "pretty"),
            ("OTEL_EXPORTER_OTLP_ENDPOINT", "http://collector:4317"),
        ])
        .unwrap();

        assert_eq!(config.port, 9000);
        assert_eq!(config.public_url, "https://foodgram.example");
        assert_eq!(config.page_size, 10);
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.otel_endpoint.as_deref(), Some("http://collector:4317"));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let bad_port = config_from(&[("DATABASE_URL", "postgres://db"), ("PORT", "http")]);
        let bad_page = config_from(&[("DATABASE_URL", "postgres://db"), ("PAGE_SIZE", "500")]);
        let bad_format = config_from(&[("DATABASE_URL", "postgres://db"), ("LOG_FORMAT", "xml")]);

        assert!(matches!(bad_port, Err(AppError::Config(_))));
        assert!(matches!(bad_page, Err(AppError::Config(_))));
        assert!(matches!(bad_format, Err(AppError::Config(_))));
    }
}
