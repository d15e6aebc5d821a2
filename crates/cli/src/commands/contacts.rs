//! Contact commands.
//!
//! # Usage
//!
//! ```bash
//! # Add contact 42 to group 7
//! sk-cli contacts join 42 7
//!
//! # Resolve price display for contact 42, or for anonymous visitors
//! sk-cli contacts price-options 42
//! sk-cli contacts price-options
//! ```

use tracing::info;

use shopkeep_contacts::db::{ContactGroupRepository, ContactRepository};
use shopkeep_core::{Contact, ContactGroupId, ContactId};

use super::CommandError;

/// Add a contact to a group.
pub async fn join(contact_id: ContactId, group_id: ContactGroupId) -> Result<(), CommandError> {
    let (_, pool) = super::connect().await?;

    ContactGroupRepository::new(&pool)
        .get_by_id(group_id)
        .await?
        .ok_or_else(|| CommandError::NotFound(format!("contact group {group_id}")))?;

    let contacts = ContactRepository::new(&pool);
    contacts
        .get_by_id(contact_id)
        .await?
        .ok_or_else(|| CommandError::NotFound(format!("contact {contact_id}")))?;

    contacts.add_to_group(contact_id, group_id).await?;
    info!(%contact_id, %group_id, "Contact joined group");
    Ok(())
}

/// Show the resolved price display options of a contact.
pub async fn price_options(contact_id: Option<ContactId>) -> Result<(), CommandError> {
    let service = super::service().await?;

    let contact = match contact_id {
        Some(id) => ContactRepository::new(service.pool())
            .get_by_id(id)
            .await?
            .ok_or_else(|| CommandError::NotFound(format!("contact {id}")))?,
        None => Contact::Anonymous,
    };

    for group in service.groups(&contact).await? {
        info!(
            hide_prices = ?group.hide_prices,
            show_prices_including_taxes = ?group.show_prices_including_taxes,
            "member of {group:?} {group}"
        );
    }

    let options = service.price_display_options(&contact).await?;
    info!(
        kind = %contact.kind(),
        precedence = %service.precedence(),
        show_prices = options.show_prices(),
        hide_prices = options.hide_prices(),
        include_taxes = ?options.include_taxes(),
        "Price display options"
    );
    Ok(())
}
