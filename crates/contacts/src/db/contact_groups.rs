//! Contact group repository.
//!
//! Default groups are ordinary rows keyed by their well-known identifier.
//! They are created on first lookup (or up front by [`ContactGroupRepository::provision_defaults`])
//! and never duplicated, since `identifier` is unique.

use sqlx::PgPool;
use tracing::{debug, info, instrument};

use shopkeep_core::{ContactGroup, ContactGroupId, ContactKind};

use super::{RepositoryError, map_unique_violation};

/// Internal row type for `shopkeep.contact_group`.
#[derive(sqlx::FromRow)]
pub(super) struct ContactGroupRow {
    id: ContactGroupId,
    identifier: Option<String>,
    name: Option<String>,
    hide_prices: Option<bool>,
    show_prices_including_taxes: Option<bool>,
}

impl From<ContactGroupRow> for ContactGroup {
    fn from(row: ContactGroupRow) -> Self {
        Self {
            id: Some(row.id),
            identifier: row.identifier,
            name: row.name,
            hide_prices: row.hide_prices,
            show_prices_including_taxes: row.show_prices_including_taxes,
        }
    }
}

/// Repository for contact group database operations.
pub struct ContactGroupRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ContactGroupRepository<'a> {
    /// Create a new contact group repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new group. Any id already set on `group` is ignored.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the identifier is taken.
    /// Returns `RepositoryError::Database` for other database errors.
    #[instrument(skip(self, group), fields(identifier = ?group.identifier))]
    pub async fn create(&self, group: &ContactGroup) -> Result<ContactGroup, RepositoryError> {
        let row = sqlx::query_as::<_, ContactGroupRow>(
            r"
            INSERT INTO shopkeep.contact_group
                (identifier, name, hide_prices, show_prices_including_taxes)
            VALUES ($1, $2, $3, $4)
            RETURNING id, identifier, name, hide_prices, show_prices_including_taxes
            ",
        )
        .bind(group.identifier.as_deref())
        .bind(group.name.as_deref())
        .bind(group.hide_prices)
        .bind(group.show_prices_including_taxes)
        .fetch_one(self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "contact group identifier already exists"))?;

        debug!(id = %row.id, "Created contact group");
        Ok(row.into())
    }

    /// Persist `group`: insert when it has no id yet, update otherwise.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the group id does not exist.
    /// Returns `RepositoryError::Conflict` if the identifier is taken.
    /// Returns `RepositoryError::Database` for other database errors.
    #[instrument(skip(self, group), fields(id = ?group.id))]
    pub async fn save(&self, group: &ContactGroup) -> Result<ContactGroup, RepositoryError> {
        let Some(id) = group.id else {
            return self.create(group).await;
        };

        let row = sqlx::query_as::<_, ContactGroupRow>(
            r"
            UPDATE shopkeep.contact_group
            SET identifier = $2,
                name = $3,
                hide_prices = $4,
                show_prices_including_taxes = $5,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, identifier, name, hide_prices, show_prices_including_taxes
            ",
        )
        .bind(id)
        .bind(group.identifier.as_deref())
        .bind(group.name.as_deref())
        .bind(group.hide_prices)
        .bind(group.show_prices_including_taxes)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "contact group identifier already exists"))?;

        row.map(Into::into).ok_or(RepositoryError::NotFound)
    }

    /// Overwrite both price display fields of a group.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the group does not exist.
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn set_price_display(
        &self,
        id: ContactGroupId,
        hide_prices: Option<bool>,
        show_prices_including_taxes: Option<bool>,
    ) -> Result<ContactGroup, RepositoryError> {
        let row = sqlx::query_as::<_, ContactGroupRow>(
            r"
            UPDATE shopkeep.contact_group
            SET hide_prices = $2,
                show_prices_including_taxes = $3,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, identifier, name, hide_prices, show_prices_including_taxes
            ",
        )
        .bind(id)
        .bind(hide_prices)
        .bind(show_prices_including_taxes)
        .fetch_optional(self.pool)
        .await?;

        row.map(Into::into).ok_or(RepositoryError::NotFound)
    }

    /// Get a group by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(
        &self,
        id: ContactGroupId,
    ) -> Result<Option<ContactGroup>, RepositoryError> {
        let row = sqlx::query_as::<_, ContactGroupRow>(
            r"
            SELECT id, identifier, name, hide_prices, show_prices_including_taxes
            FROM shopkeep.contact_group
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Get a group by its unique identifier.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_identifier(
        &self,
        identifier: &str,
    ) -> Result<Option<ContactGroup>, RepositoryError> {
        let row = sqlx::query_as::<_, ContactGroupRow>(
            r"
            SELECT id, identifier, name, hide_prices, show_prices_including_taxes
            FROM shopkeep.contact_group
            WHERE identifier = $1
            ",
        )
        .bind(identifier)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// List all groups, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<ContactGroup>, RepositoryError> {
        let rows = sqlx::query_as::<_, ContactGroupRow>(
            r"
            SELECT id, identifier, name, hide_prices, show_prices_including_taxes
            FROM shopkeep.contact_group
            ORDER BY id
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// List groups that set at least one price display field, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn with_price_display_options(&self) -> Result<Vec<ContactGroup>, RepositoryError> {
        let rows = sqlx::query_as::<_, ContactGroupRow>(
            r"
            SELECT id, identifier, name, hide_prices, show_prices_including_taxes
            FROM shopkeep.contact_group
            WHERE hide_prices IS NOT NULL OR show_prices_including_taxes IS NOT NULL
            ORDER BY id
            ",
        )
        .fetch_all(self.pool)
        .await?;

        debug!(count = rows.len(), "Loaded groups with price display options");
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Get the default group for `kind`, creating it on first access.
    ///
    /// Concurrent first calls converge on a single row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    #[instrument(skip(self))]
    pub async fn get_or_create_default(
        &self,
        kind: ContactKind,
    ) -> Result<ContactGroup, RepositoryError> {
        let identifier = kind.default_group_identifier();

        if let Some(group) = self.get_by_identifier(identifier).await? {
            return Ok(group);
        }

        let inserted = sqlx::query(
            r"
            INSERT INTO shopkeep.contact_group (identifier, name)
            VALUES ($1, $2)
            ON CONFLICT (identifier) DO NOTHING
            ",
        )
        .bind(identifier)
        .bind(kind.default_group_name())
        .execute(self.pool)
        .await?;

        if inserted.rows_affected() > 0 {
            info!(%kind, identifier, "Created default contact group");
        }

        self.get_by_identifier(identifier)
            .await?
            .ok_or_else(|| {
                RepositoryError::DataCorruption(format!(
                    "default group {identifier} missing after insert"
                ))
            })
    }

    /// Create the default groups of every contact kind.
    ///
    /// Safe to run repeatedly; existing groups are returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    #[instrument(skip(self))]
    pub async fn provision_defaults(&self) -> Result<Vec<ContactGroup>, RepositoryError> {
        let mut groups = Vec::with_capacity(ContactKind::ALL.len());
        for kind in ContactKind::ALL {
            groups.push(self.get_or_create_default(kind).await?);
        }
        Ok(groups)
    }

    /// Delete a group and its memberships.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the group does not exist.
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: ContactGroupId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM shopkeep.contact_group WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
