//! Integration tests for Shopkeep contacts.
//!
//! # Running Tests
//!
//! ```bash
//! # Point the tests at a scratch database
//! export SHOPKEEP_DATABASE_URL=postgres://localhost/shopkeep_test
//!
//! # Run integration tests (migrations are applied automatically)
//! cargo test -p shopkeep-integration-tests -- --ignored
//! ```
//!
//! Tests share one database, so every test creates its own users and groups
//! with unique ids and identifiers. Tests that touch a default group hold
//! [`DEFAULT_GROUPS`] and reset any settings they change.

use sqlx::PgPool;
use tokio::sync::Mutex;
use uuid::Uuid;

use shopkeep_contacts::db::{self, ContactGroupRepository};
use shopkeep_contacts::{ContactService, ContactsConfig};
use shopkeep_core::{ContactGroup, ContactKind, GroupPrecedence, User, UserId};

/// Serializes tests that touch default groups.
pub static DEFAULT_GROUPS: Mutex<()> = Mutex::const_new(());

/// Shared state for a database-backed test.
pub struct TestContext {
    pub pool: PgPool,
    pub service: ContactService,
}

impl TestContext {
    /// Connect to the test database and apply migrations.
    ///
    /// # Panics
    ///
    /// Panics if `SHOPKEEP_DATABASE_URL` is unset or the database is unreachable.
    pub async fn new() -> Self {
        Self::with_precedence(GroupPrecedence::JoinedFirst).await
    }

    /// Same as [`TestContext::new`] with an explicit group precedence.
    ///
    /// # Panics
    ///
    /// Panics if `SHOPKEEP_DATABASE_URL` is unset or the database is unreachable.
    pub async fn with_precedence(precedence: GroupPrecedence) -> Self {
        let config = ContactsConfig::from_env().expect("Failed to load test configuration");
        let pool = db::create_pool(&config)
            .await
            .expect("Failed to connect to test database");
        db::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let service = ContactService::new(pool.clone(), precedence);
        Self { pool, service }
    }

    /// A fresh regular account with a unique id.
    #[must_use]
    pub fn regular_user(&self) -> User {
        User::new(
            UserId::new(unique_id()),
            format!("user_{}@example.com", Uuid::new_v4().simple()),
        )
    }

    /// A fresh superuser account with a unique id.
    #[must_use]
    pub fn admin_user(&self) -> User {
        let mut user = self.regular_user();
        user.is_superuser = true;
        user
    }

    /// Reset the price display settings of a default group.
    ///
    /// # Panics
    ///
    /// Panics if the database query fails.
    pub async fn reset_default_group(&self, kind: ContactKind) -> ContactGroup {
        let groups = ContactGroupRepository::new(&self.pool);
        let group = groups
            .get_or_create_default(kind)
            .await
            .expect("Failed to load default group");
        let id = group.id.expect("Persisted group has an id");
        groups
            .set_price_display(id, None, None)
            .await
            .expect("Failed to reset default group")
    }
}

/// A positive id unique across tests and test runs.
#[must_use]
pub fn unique_id() -> i64 {
    let (high, _) = Uuid::new_v4().as_u64_pair();
    (high >> 1).cast_signed()
}

/// A group identifier unique across tests and test runs.
#[must_use]
pub fn unique_identifier(prefix: &str) -> String {
    format!("{prefix}_{}", Uuid::new_v4().simple())
}
