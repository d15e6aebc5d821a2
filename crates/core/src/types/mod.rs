//! Core types for Shopkeep.
//!
//! This module provides the contact model: type-safe ids, the [`Contact`] sum
//! type, contact groups and the user accounts contacts are created from.

pub mod contact;
pub mod contact_group;
pub mod id;
pub mod user;

pub use contact::{
    CompanyContact, Contact, ContactDetails, ContactError, ContactKind, ContactOperation,
    NewPersonContact, PersonContact,
};
pub use contact_group::ContactGroup;
pub use id::*;
pub use user::User;
