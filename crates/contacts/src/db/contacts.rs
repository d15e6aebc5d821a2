//! Contact repository.
//!
//! Person and company contacts share the `shopkeep.contact` table; `kind`
//! tells them apart. Anonymous contacts never reach this module's queries:
//! [`ContactRepository::save`] and [`ContactRepository::delete`] reject them
//! up front.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{debug, instrument};

use shopkeep_core::{
    CompanyContact, Contact, ContactDetails, ContactGroup, ContactGroupId, ContactId, ContactKind,
    ContactOperation, NewPersonContact, PersonContact, UserId,
};

use super::contact_groups::ContactGroupRow;
use super::{RepositoryError, map_unique_violation};

/// Internal row type for `shopkeep.contact`.
#[derive(sqlx::FromRow)]
struct ContactRow {
    id: ContactId,
    kind: String,
    identifier: Option<String>,
    is_active: bool,
    marketing_permission: bool,
    name: String,
    prefix: String,
    suffix: String,
    name_ext: String,
    email: String,
    phone: String,
    www: String,
    language: String,
    timezone: Option<String>,
    user_id: Option<UserId>,
    first_name: String,
    last_name: String,
    tax_number: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<ContactRow> for Contact {
    type Error = RepositoryError;

    fn try_from(row: ContactRow) -> Result<Self, Self::Error> {
        let details = ContactDetails {
            identifier: row.identifier,
            is_active: row.is_active,
            marketing_permission: row.marketing_permission,
            prefix: row.prefix,
            suffix: row.suffix,
            name_ext: row.name_ext,
            email: row.email,
            phone: row.phone,
            www: row.www,
            language: row.language,
            timezone: row.timezone,
            ..ContactDetails::new(row.id, row.name, row.created_at)
        };

        let kind: ContactKind = row
            .kind
            .parse()
            .map_err(RepositoryError::DataCorruption)?;

        match kind {
            ContactKind::Person => Ok(Self::Person(PersonContact {
                details,
                user_id: row.user_id,
                first_name: row.first_name,
                last_name: row.last_name,
                is_all_seeing: false,
            })),
            ContactKind::Company => Ok(Self::Company(CompanyContact {
                details,
                tax_number: row.tax_number,
            })),
            ContactKind::Anonymous => Err(RepositoryError::DataCorruption(format!(
                "stored contact {} has kind anonymous",
                row.id
            ))),
        }
    }
}

/// Parameters for creating a company contact.
#[derive(Debug, Clone)]
pub struct NewCompanyContact {
    /// Company name.
    pub name: String,
    /// Contact email address.
    pub email: String,
    /// Tax registration number.
    pub tax_number: String,
}

/// Repository for contact database operations.
pub struct ContactRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ContactRepository<'a> {
    /// Create a new contact repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a contact by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored row is invalid.
    pub async fn get_by_id(&self, id: ContactId) -> Result<Option<Contact>, RepositoryError> {
        let row = sqlx::query_as::<_, ContactRow>(
            r"
            SELECT id, kind, identifier, is_active, marketing_permission,
                   name, prefix, suffix, name_ext, email, phone, www, language, timezone,
                   user_id, first_name, last_name, tax_number, created_at
            FROM shopkeep.contact
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(Contact::try_from).transpose()
    }

    /// Get the person contact linked to a user account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored row is invalid.
    pub async fn get_person_by_user(
        &self,
        user_id: UserId,
    ) -> Result<Option<PersonContact>, RepositoryError> {
        let row = sqlx::query_as::<_, ContactRow>(
            r"
            SELECT id, kind, identifier, is_active, marketing_permission,
                   name, prefix, suffix, name_ext, email, phone, www, language, timezone,
                   user_id, first_name, last_name, tax_number, created_at
            FROM shopkeep.contact
            WHERE user_id = $1 AND kind = 'person'
            ",
        )
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        match row.map(Contact::try_from).transpose()? {
            Some(Contact::Person(person)) => Ok(Some(person)),
            Some(other) => Err(RepositoryError::DataCorruption(format!(
                "contact for user {user_id} has kind {}",
                other.kind()
            ))),
            None => Ok(None),
        }
    }

    /// Create a person contact linked to a user account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the user already has a contact.
    /// Returns `RepositoryError::Database` for other database errors.
    #[instrument(skip(self, new), fields(user_id = %new.user_id))]
    pub async fn create_person(
        &self,
        new: &NewPersonContact,
    ) -> Result<PersonContact, RepositoryError> {
        let row = sqlx::query_as::<_, ContactRow>(
            r"
            INSERT INTO shopkeep.contact
                (kind, user_id, name, first_name, last_name, email, is_active)
            VALUES ('person', $1, $2, $3, $4, $5, $6)
            RETURNING id, kind, identifier, is_active, marketing_permission,
                      name, prefix, suffix, name_ext, email, phone, www, language, timezone,
                      user_id, first_name, last_name, tax_number, created_at
            ",
        )
        .bind(new.user_id)
        .bind(&new.name)
        .bind(&new.first_name)
        .bind(&new.last_name)
        .bind(&new.email)
        .bind(new.is_active)
        .fetch_one(self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "user already has a person contact"))?;

        debug!(id = %row.id, "Created person contact");
        match Contact::try_from(row)? {
            Contact::Person(person) => Ok(person),
            other => Err(RepositoryError::DataCorruption(format!(
                "created person contact has kind {}",
                other.kind()
            ))),
        }
    }

    /// Create a company contact.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    #[instrument(skip(self, new), fields(name = %new.name))]
    pub async fn create_company(
        &self,
        new: &NewCompanyContact,
    ) -> Result<CompanyContact, RepositoryError> {
        let row = sqlx::query_as::<_, ContactRow>(
            r"
            INSERT INTO shopkeep.contact (kind, name, email, tax_number)
            VALUES ('company', $1, $2, $3)
            RETURNING id, kind, identifier, is_active, marketing_permission,
                      name, prefix, suffix, name_ext, email, phone, www, language, timezone,
                      user_id, first_name, last_name, tax_number, created_at
            ",
        )
        .bind(&new.name)
        .bind(&new.email)
        .bind(&new.tax_number)
        .fetch_one(self.pool)
        .await?;

        debug!(id = %row.id, "Created company contact");
        match Contact::try_from(row)? {
            Contact::Company(company) => Ok(company),
            other => Err(RepositoryError::DataCorruption(format!(
                "created company contact has kind {}",
                other.kind()
            ))),
        }
    }

    /// Write all fields of an identified contact back to the database.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Contact` for anonymous contacts.
    /// Returns `RepositoryError::NotFound` if the contact no longer exists.
    /// Returns `RepositoryError::Conflict` if the identifier is taken.
    /// Returns `RepositoryError::Database` for other database errors.
    #[instrument(skip(self, contact), fields(id = ?contact.id()))]
    pub async fn save(&self, contact: &Contact) -> Result<(), RepositoryError> {
        contact.ensure_persistable(ContactOperation::Save)?;

        let (details, user_id, first_name, last_name, tax_number) = match contact {
            Contact::Person(person) => (
                &person.details,
                person.user_id,
                person.first_name.as_str(),
                person.last_name.as_str(),
                "",
            ),
            Contact::Company(company) => {
                (&company.details, None, "", "", company.tax_number.as_str())
            }
            Contact::Anonymous => return Ok(()),
        };

        let result = sqlx::query(
            r"
            UPDATE shopkeep.contact
            SET identifier = $2,
                is_active = $3,
                marketing_permission = $4,
                name = $5,
                prefix = $6,
                suffix = $7,
                name_ext = $8,
                email = $9,
                phone = $10,
                www = $11,
                language = $12,
                timezone = $13,
                user_id = $14,
                first_name = $15,
                last_name = $16,
                tax_number = $17,
                updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(details.id)
        .bind(details.identifier.as_deref())
        .bind(details.is_active)
        .bind(details.marketing_permission)
        .bind(&details.name)
        .bind(&details.prefix)
        .bind(&details.suffix)
        .bind(&details.name_ext)
        .bind(&details.email)
        .bind(&details.phone)
        .bind(&details.www)
        .bind(&details.language)
        .bind(details.timezone.as_deref())
        .bind(user_id)
        .bind(first_name)
        .bind(last_name)
        .bind(tax_number)
        .execute(self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "contact identifier already exists"))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Delete an identified contact and its memberships.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Contact` for anonymous contacts.
    /// Returns `RepositoryError::NotFound` if the contact does not exist.
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self, contact), fields(id = ?contact.id()))]
    pub async fn delete(&self, contact: &Contact) -> Result<(), RepositoryError> {
        contact.ensure_persistable(ContactOperation::Delete)?;
        let Some(id) = contact.id() else {
            return Err(RepositoryError::NotFound);
        };

        let result = sqlx::query("DELETE FROM shopkeep.contact WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Add a contact to a group. Joining a group twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the contact or group does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    #[instrument(skip(self))]
    pub async fn add_to_group(
        &self,
        contact_id: ContactId,
        group_id: ContactGroupId,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO shopkeep.contact_group_member (contact_id, group_id)
            VALUES ($1, $2)
            ON CONFLICT (contact_id, group_id) DO NOTHING
            ",
        )
        .bind(contact_id)
        .bind(group_id)
        .execute(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_foreign_key_violation()
            {
                return RepositoryError::NotFound;
            }
            RepositoryError::Database(e)
        })?;

        Ok(())
    }

    /// Remove a contact from a group.
    ///
    /// Returns whether a membership was removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn remove_from_group(
        &self,
        contact_id: ContactId,
        group_id: ContactGroupId,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            DELETE FROM shopkeep.contact_group_member
            WHERE contact_id = $1 AND group_id = $2
            ",
        )
        .bind(contact_id)
        .bind(group_id)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Groups the contact explicitly joined, in join order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn joined_groups(
        &self,
        contact_id: ContactId,
    ) -> Result<Vec<ContactGroup>, RepositoryError> {
        let rows = sqlx::query_as::<_, ContactGroupRow>(
            r"
            SELECT g.id, g.identifier, g.name, g.hide_prices, g.show_prices_including_taxes
            FROM shopkeep.contact_group_member m
            JOIN shopkeep.contact_group g ON g.id = m.group_id
            WHERE m.contact_id = $1
            ORDER BY m.id
            ",
        )
        .bind(contact_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
