//! Shopkeep Contacts - Contact persistence and price display resolution.
//!
//! # Modules
//!
//! - [`config`] - Configuration loaded from environment variables
//! - [`db`] - `PostgreSQL` repositories and migrations
//! - [`service`] - [`ContactService`], the entry point for request handlers
//!
//! # Example
//!
//! ```rust,no_run
//! use shopkeep_contacts::{ContactService, ContactsConfig, db};
//! use shopkeep_core::Contact;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ContactsConfig::from_env()?;
//! let pool = db::create_pool(&config).await?;
//! let service = ContactService::new(pool, config.price_precedence);
//!
//! let options = service.price_display_options(&Contact::Anonymous).await?;
//! assert!(options.show_prices());
//! # Ok(())
//! # }
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod service;

pub use config::{ConfigError, ContactsConfig};
pub use db::RepositoryError;
pub use service::ContactService;
