//! Contacts configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SHOPKEEP_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! ## Optional
//! - `SHOPKEEP_DB_MAX_CONNECTIONS` - Pool size (default: 10)
//! - `SHOPKEEP_PRICE_PRECEDENCE` - `joined_first` or `default_first` (default: `joined_first`)

use secrecy::SecretString;
use thiserror::Error;

use shopkeep_core::GroupPrecedence;

const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Contacts configuration.
#[derive(Debug, Clone)]
pub struct ContactsConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// Maximum number of pooled connections
    pub max_connections: u32,
    /// Whether joined groups or the default group decide price display first
    pub price_precedence: GroupPrecedence,
}

impl ContactsConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the database URL is missing or an optional
    /// variable cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Same as [`ContactsConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup("SHOPKEEP_DATABASE_URL")
            .or_else(|| lookup("DATABASE_URL"))
            .map(SecretString::from)
            .ok_or_else(|| ConfigError::MissingEnvVar("SHOPKEEP_DATABASE_URL".to_string()))?;

        let max_connections = match lookup("SHOPKEEP_DB_MAX_CONNECTIONS") {
            Some(value) => parse_max_connections(&value)?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        let price_precedence = match lookup("SHOPKEEP_PRICE_PRECEDENCE") {
            Some(value) => value.parse::<GroupPrecedence>().map_err(|e| {
                ConfigError::InvalidEnvVar("SHOPKEEP_PRICE_PRECEDENCE".to_string(), e)
            })?,
            None => GroupPrecedence::default(),
        };

        Ok(Self {
            database_url,
            max_connections,
            price_precedence,
        })
    }
}

fn parse_max_connections(value: &str) -> Result<u32, ConfigError> {
    let parsed = value.parse::<u32>().map_err(|e| {
        ConfigError::InvalidEnvVar("SHOPKEEP_DB_MAX_CONNECTIONS".to_string(), e.to_string())
    })?;

    if parsed == 0 {
        return Err(ConfigError::InvalidEnvVar(
            "SHOPKEEP_DB_MAX_CONNECTIONS".to_string(),
            "must be at least 1".to_string(),
        ));
    }
    Ok(parsed)
}
