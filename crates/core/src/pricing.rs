//! Price display options and their resolution for a contact.
//!
//! A contact sees prices according to the first group that has an opinion.
//! Candidate groups are the groups the contact explicitly joined and the
//! default group of its kind; [`GroupPrecedence`] decides which side is asked
//! first.
//!
//! # Resolution
//!
//! Among joined groups (membership order, default group excluded) that set
//! any price display field:
//!
//! 1. the first group that sets `hide_prices` wins,
//! 2. otherwise the first group that sets `show_prices_including_taxes` wins.
//!
//! The default group is used when it sets either field. When no candidate has
//! an opinion the result is [`PriceDisplayOptions::default`]: prices shown,
//! tax inclusion unspecified.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::types::ContactGroup;

/// How prices are displayed to a contact.
///
/// `hide_prices` is derived and always the negation of `show_prices`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PriceDisplayOptions {
    include_taxes: Option<bool>,
    show_prices: bool,
}

impl PriceDisplayOptions {
    #[must_use]
    pub const fn new(include_taxes: Option<bool>, show_prices: bool) -> Self {
        Self {
            include_taxes,
            show_prices,
        }
    }

    /// Whether displayed prices include taxes; `None` defers to the shop default.
    #[must_use]
    pub const fn include_taxes(&self) -> Option<bool> {
        self.include_taxes
    }

    /// Tax inclusion with the shop-wide default applied.
    #[must_use]
    pub const fn include_taxes_or(&self, default: bool) -> bool {
        match self.include_taxes {
            Some(include) => include,
            None => default,
        }
    }

    #[must_use]
    pub const fn show_prices(&self) -> bool {
        self.show_prices
    }

    #[must_use]
    pub const fn hide_prices(&self) -> bool {
        !self.show_prices
    }
}

impl Default for PriceDisplayOptions {
    fn default() -> Self {
        Self::new(None, true)
    }
}

/// Which candidate groups are consulted first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupPrecedence {
    /// Joined groups first, the default group as fallback.
    #[default]
    JoinedFirst,
    /// The default group first, joined groups as fallback.
    DefaultFirst,
}

impl fmt::Display for GroupPrecedence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::JoinedFirst => write!(f, "joined_first"),
            Self::DefaultFirst => write!(f, "default_first"),
        }
    }
}

impl std::str::FromStr for GroupPrecedence {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "joined_first" => Ok(Self::JoinedFirst),
            "default_first" => Ok(Self::DefaultFirst),
            _ => Err(format!("invalid group precedence: {s}")),
        }
    }
}

/// Resolve the price display options for a contact.
///
/// `default_group` is the default group of the contact's kind, `joined` the
/// groups the contact explicitly belongs to in membership order. The default
/// group is ignored if it also appears in `joined`.
#[must_use]
pub fn resolve_price_display_options(
    default_group: Option<&ContactGroup>,
    joined: &[ContactGroup],
    precedence: GroupPrecedence,
) -> PriceDisplayOptions {
    let from_default = default_group
        .filter(|group| group.has_price_display_options())
        .map(ContactGroup::price_display_options);

    let from_joined = || resolve_from_joined(default_group, joined);

    let resolved = match precedence {
        GroupPrecedence::JoinedFirst => from_joined().or(from_default),
        GroupPrecedence::DefaultFirst => from_default.or_else(from_joined),
    };

    resolved.unwrap_or_default()
}

fn resolve_from_joined(
    default_group: Option<&ContactGroup>,
    joined: &[ContactGroup],
) -> Option<PriceDisplayOptions> {
    let candidates: Vec<&ContactGroup> = joined
        .iter()
        .filter(|group| !is_same_group(group, default_group))
        .filter(|group| group.has_price_display_options())
        .collect();

    candidates
        .iter()
        .find(|group| group.hide_prices.is_some())
        .or_else(|| {
            candidates
                .iter()
                .find(|group| group.show_prices_including_taxes.is_some())
        })
        .map(|group| group.price_display_options())
}

fn is_same_group(group: &ContactGroup, default_group: Option<&ContactGroup>) -> bool {
    let Some(default_group) = default_group else {
        return false;
    };

    match (group.id, default_group.id) {
        (Some(a), Some(b)) => a == b,
        _ => {
            default_group.identifier.is_some() && group.identifier == default_group.identifier
        }
    }
}
