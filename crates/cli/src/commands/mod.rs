//! CLI command implementations.

pub mod contacts;
pub mod groups;
pub mod migrate;

use sqlx::PgPool;
use thiserror::Error;

use shopkeep_contacts::{ConfigError, ContactService, ContactsConfig, RepositoryError, db};

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration error.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// Referenced entity does not exist.
    #[error("{0} not found")]
    NotFound(String),
}

/// Load configuration and connect to the database.
async fn connect() -> Result<(ContactsConfig, PgPool), CommandError> {
    let config = ContactsConfig::from_env()?;

    tracing::info!("Connecting to contacts database...");
    let pool = db::create_pool(&config).await?;
    Ok((config, pool))
}

/// Connect and build a contact service with the configured precedence.
async fn service() -> Result<ContactService, CommandError> {
    let (config, pool) = connect().await?;
    Ok(ContactService::new(pool, config.price_precedence))
}
