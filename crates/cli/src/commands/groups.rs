//! Contact group commands.
//!
//! # Usage
//!
//! ```bash
//! # Create the default groups up front instead of on first lookup
//! sk-cli groups provision
//!
//! # List all groups, or only those overriding price display
//! sk-cli groups list
//! sk-cli groups list --with-price-display-options
//!
//! # Create a group
//! sk-cli groups create -i wholesale -n "Wholesale" --taxes false
//!
//! # Delete group 9
//! sk-cli groups delete 9
//!
//! # Hide prices for group 7 and stop overriding tax display
//! sk-cli groups set-prices 7 --hide-prices true --clear-taxes
//! ```

use tracing::info;

use shopkeep_contacts::RepositoryError;
use shopkeep_contacts::db::ContactGroupRepository;
use shopkeep_core::{ContactGroup, ContactGroupId};

use super::CommandError;

/// Requested change to one tri-state price display field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldUpdate {
    /// Leave the field as it is.
    Keep,
    /// Set the field.
    Set(bool),
    /// Reset the field to "no opinion".
    Clear,
}

impl FieldUpdate {
    /// Combine a `--field <bool>` and a `--clear-field` argument.
    #[must_use]
    pub const fn from_args(value: Option<bool>, clear: bool) -> Self {
        match (value, clear) {
            (_, true) => Self::Clear,
            (Some(value), false) => Self::Set(value),
            (None, false) => Self::Keep,
        }
    }

    /// Apply the update to the current value.
    #[must_use]
    pub const fn apply(self, current: Option<bool>) -> Option<bool> {
        match self {
            Self::Keep => current,
            Self::Set(value) => Some(value),
            Self::Clear => None,
        }
    }
}

/// Create the default group of every contact kind.
pub async fn provision() -> Result<(), CommandError> {
    let service = super::service().await?;
    let groups = service.provision_default_groups().await?;

    for group in &groups {
        info!("{group:?} {group}");
    }
    info!("Provisioned {} default groups", groups.len());
    Ok(())
}

/// List contact groups.
pub async fn list(with_price_display_options: bool) -> Result<(), CommandError> {
    let (_, pool) = super::connect().await?;
    let repo = ContactGroupRepository::new(&pool);

    let groups = if with_price_display_options {
        repo.with_price_display_options().await?
    } else {
        repo.list().await?
    };

    for group in &groups {
        log_group(group);
    }
    info!("{} groups", groups.len());
    Ok(())
}

/// Create a contact group.
pub async fn create(
    identifier: Option<String>,
    name: Option<String>,
    hide_prices: Option<bool>,
    taxes: Option<bool>,
) -> Result<(), CommandError> {
    let (_, pool) = super::connect().await?;

    let group = ContactGroup {
        id: None,
        identifier,
        name,
        hide_prices,
        show_prices_including_taxes: taxes,
    };

    let group = ContactGroupRepository::new(&pool).create(&group).await?;
    info!("Created contact group");
    log_group(&group);
    Ok(())
}

/// Change the price display settings of a group.
pub async fn set_prices(
    id: ContactGroupId,
    hide_prices: FieldUpdate,
    taxes: FieldUpdate,
) -> Result<(), CommandError> {
    let (_, pool) = super::connect().await?;
    let repo = ContactGroupRepository::new(&pool);

    let group = repo
        .get_by_id(id)
        .await?
        .ok_or_else(|| CommandError::NotFound(format!("contact group {id}")))?;

    let group = repo
        .set_price_display(
            id,
            hide_prices.apply(group.hide_prices),
            taxes.apply(group.show_prices_including_taxes),
        )
        .await?;

    info!("Updated contact group");
    log_group(&group);
    Ok(())
}

/// Delete a contact group.
///
/// Default groups may be deleted too; they are recreated on next lookup.
pub async fn delete(id: ContactGroupId) -> Result<(), CommandError> {
    let (_, pool) = super::connect().await?;

    match ContactGroupRepository::new(&pool).delete(id).await {
        Ok(()) => {
            info!(%id, "Deleted contact group");
            Ok(())
        }
        Err(RepositoryError::NotFound) => Err(CommandError::NotFound(format!("contact group {id}"))),
        Err(e) => Err(e.into()),
    }
}

fn log_group(group: &ContactGroup) {
    let options = group.price_display_options();
    info!(
        hide_prices = ?group.hide_prices,
        show_prices_including_taxes = ?group.show_prices_including_taxes,
        show_prices = options.show_prices(),
        "{group:?} {group}"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_update_from_args() {
        assert_eq!(FieldUpdate::from_args(None, false), FieldUpdate::Keep);
        assert_eq!(FieldUpdate::from_args(Some(false), false), FieldUpdate::Set(false));
        assert_eq!(FieldUpdate::from_args(None, true), FieldUpdate::Clear);
    }

    #[test]
    fn test_field_update_apply() {
        for current in [Some(true), Some(false), None] {
            assert_eq!(FieldUpdate::Keep.apply(current), current);
            assert_eq!(FieldUpdate::Set(true).apply(current), Some(true));
            assert_eq!(FieldUpdate::Clear.apply(current), None);
        }
    }
}
