//! Contact groups.
//!
//! Groups bundle contacts that share pricing and display configuration. Both
//! price display fields are tri-state: `None` means the group has no opinion
//! and resolution moves on to the next candidate group.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::contact::ContactKind;
use super::id::ContactGroupId;
use crate::pricing::PriceDisplayOptions;

/// A named bucket of contacts sharing display and pricing configuration.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactGroup {
    /// Database id, `None` until the group is persisted.
    pub id: Option<ContactGroupId>,
    /// Optional unique machine-readable identifier.
    pub identifier: Option<String>,
    /// Human-readable name.
    pub name: Option<String>,
    /// Hide prices from members of this group.
    pub hide_prices: Option<bool>,
    /// Show prices with taxes included to members of this group.
    pub show_prices_including_taxes: Option<bool>,
}

impl ContactGroup {
    /// An unsaved group with nothing set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The unsaved default group for `kind`.
    #[must_use]
    pub fn default_for(kind: ContactKind) -> Self {
        Self::new()
            .with_identifier(kind.default_group_identifier())
            .with_name(kind.default_group_name())
    }

    #[must_use]
    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub const fn with_hide_prices(mut self, hide_prices: Option<bool>) -> Self {
        self.hide_prices = hide_prices;
        self
    }

    #[must_use]
    pub const fn with_show_prices_including_taxes(mut self, taxes: Option<bool>) -> Self {
        self.show_prices_including_taxes = taxes;
        self
    }

    /// The kind this group is the default group of, if any.
    #[must_use]
    pub fn default_kind(&self) -> Option<ContactKind> {
        self.identifier
            .as_deref()
            .and_then(ContactKind::from_default_group_identifier)
    }

    /// Whether either price display field is set.
    #[must_use]
    pub const fn has_price_display_options(&self) -> bool {
        self.hide_prices.is_some() || self.show_prices_including_taxes.is_some()
    }

    /// Price display options described by this group alone.
    ///
    /// An unset `hide_prices` shows prices; an unset tax flag stays
    /// unspecified.
    #[must_use]
    pub fn price_display_options(&self) -> PriceDisplayOptions {
        PriceDisplayOptions::new(
            self.show_prices_including_taxes,
            !self.hide_prices.unwrap_or(false),
        )
    }
}

impl fmt::Display for ContactGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => f.write_str(name),
            _ => write!(
                f,
                "ContactGroup:{}",
                self.identifier.as_deref().unwrap_or("None")
            ),
        }
    }
}

impl fmt::Debug for ContactGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<ContactGroup:")?;
        match self.id {
            Some(id) => write!(f, "{id}")?,
            None => write!(f, "None")?,
        }
        if let Some(identifier) = self.identifier.as_deref() {
            write!(f, "-{identifier}")?;
        }
        write!(f, ">")
    }
}
