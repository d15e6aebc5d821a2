//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! sk-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `SHOPKEEP_DATABASE_URL` - `PostgreSQL` connection string
//!
//! Migration files live in `crates/contacts/migrations/`.

use shopkeep_contacts::db;

use super::CommandError;

/// Run contacts database migrations.
pub async fn run() -> Result<(), CommandError> {
    let (_, pool) = super::connect().await?;
    db::run_migrations(&pool).await?;
    Ok(())
}
