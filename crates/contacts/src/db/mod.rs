//! Database operations for contacts `PostgreSQL`.
//!
//! # Schema: `shopkeep`
//!
//! ## Tables
//!
//! - `contact_group` - Groups with their price display overrides
//! - `contact` - Person and company contacts (anonymous contacts are never stored)
//! - `contact_group_member` - Explicit group memberships, in join order
//!
//! Default groups are not stored as memberships; every contact implicitly
//! belongs to the default group of its kind.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/contacts/migrations/` and run via:
//! ```bash
//! cargo run -p shopkeep-cli -- migrate
//! ```

pub mod contact_groups;
pub mod contacts;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::migrate::{MigrateError, Migrator};
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use shopkeep_core::ContactError;

use crate::config::ContactsConfig;

pub use contact_groups::ContactGroupRepository;
pub use contacts::ContactRepository;

/// Embedded migrations for the `shopkeep` schema.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., duplicate identifier).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// The contact does not support the requested operation.
    #[error(transparent)]
    Contact(#[from] ContactError),
}

/// Create a `PostgreSQL` connection pool from configuration.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(config: &ContactsConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .connect(config.database_url.expose_secret())
        .await
}

/// Apply pending migrations.
///
/// # Errors
///
/// Returns `MigrateError` if a migration fails or the applied history
/// diverges from the embedded migrations.
pub async fn run_migrations(pool: &PgPool) -> Result<(), MigrateError> {
    tracing::info!("Running contacts migrations");
    MIGRATOR.run(pool).await?;
    tracing::info!("Contacts migrations complete");
    Ok(())
}

/// Map unique violations to `RepositoryError::Conflict`.
fn map_unique_violation(e: sqlx::Error, message: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(message.to_owned());
    }
    RepositoryError::Database(e)
}
