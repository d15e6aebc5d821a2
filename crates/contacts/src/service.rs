//! Contact service: repositories wired to price display resolution.
//!
//! The service is cheap to clone and meant to be shared. It memoizes the id
//! of each kind's default group, but always reloads the group row itself so
//! edits to its price display settings are picked up immediately.

use moka::future::Cache;
use sqlx::PgPool;
use tracing::{debug, instrument};

use shopkeep_core::{
    Contact, ContactGroup, ContactGroupId, ContactKind, GroupPrecedence, NewPersonContact,
    PriceDisplayOptions, User, resolve_price_display_options,
};

use crate::db::{ContactGroupRepository, ContactRepository, RepositoryError};

/// Contact lookups and price display resolution backed by `PostgreSQL`.
#[derive(Clone)]
pub struct ContactService {
    pool: PgPool,
    precedence: GroupPrecedence,
    default_group_ids: Cache<ContactKind, ContactGroupId>,
}

impl ContactService {
    /// Create a new contact service.
    #[must_use]
    pub fn new(pool: PgPool, precedence: GroupPrecedence) -> Self {
        let default_group_ids = Cache::builder()
            .max_capacity(ContactKind::ALL.len() as u64)
            .build();

        Self {
            pool,
            precedence,
            default_group_ids,
        }
    }

    /// The underlying connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// The configured group precedence.
    #[must_use]
    pub const fn precedence(&self) -> GroupPrecedence {
        self.precedence
    }

    /// Create the default groups of every kind and prime the id cache.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    #[instrument(skip(self))]
    pub async fn provision_default_groups(&self) -> Result<Vec<ContactGroup>, RepositoryError> {
        let groups = ContactGroupRepository::new(&self.pool)
            .provision_defaults()
            .await?;

        for group in &groups {
            if let (Some(kind), Some(id)) = (group.default_kind(), group.id) {
                self.default_group_ids.insert(kind, id).await;
            }
        }
        Ok(groups)
    }

    /// The default group of `kind`, created on first access.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn default_group(&self, kind: ContactKind) -> Result<ContactGroup, RepositoryError> {
        let groups = ContactGroupRepository::new(&self.pool);

        if let Some(id) = self.default_group_ids.get(&kind).await {
            if let Some(group) = groups.get_by_id(id).await? {
                return Ok(group);
            }
            // Row deleted behind our back; recreate below.
            self.default_group_ids.invalidate(&kind).await;
        }

        let group = groups.get_or_create_default(kind).await?;
        if let Some(id) = group.id {
            self.default_group_ids.insert(kind, id).await;
        }
        Ok(group)
    }

    /// The contact for a user account, or the anonymous contact without one.
    ///
    /// A person contact is created on first use and copies the account's
    /// activation state, full name and email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    #[instrument(skip(self, user), fields(user_id = ?user.map(|u| u.id)))]
    pub async fn person_contact_for(&self, user: Option<&User>) -> Result<Contact, RepositoryError> {
        let Some(user) = user else {
            return Ok(Contact::Anonymous);
        };

        let contacts = ContactRepository::new(&self.pool);
        let person = match contacts.get_person_by_user(user.id).await? {
            Some(person) => person,
            None => match contacts.create_person(&NewPersonContact::from_user(user)).await {
                Ok(person) => person,
                // Lost a race with a concurrent first request for the same user.
                Err(RepositoryError::Conflict(_)) => contacts
                    .get_person_by_user(user.id)
                    .await?
                    .ok_or(RepositoryError::NotFound)?,
                Err(e) => return Err(e),
            },
        };

        Ok(Contact::Person(person.with_user(user)))
    }

    /// All groups of a contact: its default group followed by joined groups.
    ///
    /// The anonymous contact belongs to the anonymous default group only.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn groups(&self, contact: &Contact) -> Result<Vec<ContactGroup>, RepositoryError> {
        let default_group = self.default_group(contact.kind()).await?;
        let joined = self.joined_groups(contact).await?;

        let mut groups = Vec::with_capacity(joined.len() + 1);
        groups.extend(joined.into_iter().filter(|g| g.id != default_group.id));
        groups.insert(0, default_group);
        Ok(groups)
    }

    /// Resolve how prices are displayed to `contact`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if loading groups fails.
    #[instrument(skip(self, contact), fields(kind = %contact.kind(), id = ?contact.id()))]
    pub async fn price_display_options(
        &self,
        contact: &Contact,
    ) -> Result<PriceDisplayOptions, RepositoryError> {
        let default_group = self.default_group(contact.kind()).await?;
        let joined = self.joined_groups(contact).await?;

        let options =
            resolve_price_display_options(Some(&default_group), &joined, self.precedence);

        debug!(
            show_prices = options.show_prices(),
            include_taxes = ?options.include_taxes(),
            "Resolved price display options"
        );
        Ok(options)
    }

    async fn joined_groups(&self, contact: &Contact) -> Result<Vec<ContactGroup>, RepositoryError> {
        match contact.id() {
            Some(id) => ContactRepository::new(&self.pool).joined_groups(id).await,
            None => Ok(Vec::new()),
        }
    }
}
