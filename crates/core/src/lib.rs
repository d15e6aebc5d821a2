//! Shopkeep Core - Contact and pricing types.
//!
//! This crate provides the contact model shared by all Shopkeep components:
//! - `contacts` - Repositories and the contact service (`PostgreSQL`)
//! - `cli` - Command-line tools for migrations and group management
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access. Persistence hands fully loaded contacts and groups to this crate and
//! gets plain values back.
//!
//! # Modules
//!
//! - [`types`] - Ids, contacts, contact groups and user accounts
//! - [`pricing`] - Price display options and their resolution for a contact

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod pricing;
pub mod types;

pub use pricing::{GroupPrecedence, PriceDisplayOptions, resolve_price_display_options};
pub use types::*;
