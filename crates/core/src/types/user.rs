//! User accounts as handed over by the authentication layer.
//!
//! Authentication itself lives elsewhere; the contact layer only needs enough
//! of the account to create and describe the person contact linked to it.

use serde::{Deserialize, Serialize};

use super::id::UserId;

/// An authenticated user account.
///
/// "No authenticated user" is expressed as `Option::<&User>::None` at call
/// sites rather than as a sentinel account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Account id.
    pub id: UserId,
    /// Login email address.
    pub email: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Whether the account may log in.
    pub is_active: bool,
    /// Privileged account that sees everything, including inactive contacts.
    pub is_superuser: bool,
}

impl User {
    /// Create an active, unprivileged account.
    #[must_use]
    pub fn new(id: UserId, email: impl Into<String>) -> Self {
        Self {
            id,
            email: email.into(),
            first_name: String::new(),
            last_name: String::new(),
            is_active: true,
            is_superuser: false,
        }
    }

    /// First and last name joined by a space, trimmed.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_owned()
    }
}
