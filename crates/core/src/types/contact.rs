//! Contacts: the customers a shop sells to.
//!
//! A [`Contact`] is either anonymous (a visitor with no account) or an
//! identified person or company. The anonymous case carries no identity at
//! all, so it cannot be saved or deleted; repositories check
//! [`Contact::ensure_persistable`] before touching the database.

use core::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::{ContactId, UserId};
use super::user::User;

/// Errors raised by contact operations.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactError {
    /// The operation is not available for this kind of contact.
    #[error("{operation} is not supported for anonymous contacts")]
    UnsupportedOperation {
        /// The rejected operation.
        operation: ContactOperation,
    },
}

/// Persistence operations that may be rejected for a contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContactOperation {
    Save,
    Delete,
}

impl fmt::Display for ContactOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Save => write!(f, "save"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

/// The kind of a contact.
///
/// Every kind has exactly one well-known default group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactKind {
    Anonymous,
    Person,
    Company,
}

impl ContactKind {
    /// All kinds, in provisioning order.
    pub const ALL: [Self; 3] = [Self::Anonymous, Self::Person, Self::Company];

    /// Identifier of the default group for this kind.
    #[must_use]
    pub const fn default_group_identifier(self) -> &'static str {
        match self {
            Self::Anonymous => "default_anonymous_group",
            Self::Person => "default_person_group",
            Self::Company => "default_company_group",
        }
    }

    /// Display name of the default group for this kind.
    #[must_use]
    pub const fn default_group_name(self) -> &'static str {
        match self {
            Self::Anonymous => "Anonymous Contacts",
            Self::Person => "Person Contacts",
            Self::Company => "Company Contacts",
        }
    }

    /// Find the kind whose default group uses `identifier`.
    #[must_use]
    pub fn from_default_group_identifier(identifier: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.default_group_identifier() == identifier)
    }
}

impl fmt::Display for ContactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Anonymous => write!(f, "anonymous"),
            Self::Person => write!(f, "person"),
            Self::Company => write!(f, "company"),
        }
    }
}

impl std::str::FromStr for ContactKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "anonymous" => Ok(Self::Anonymous),
            "person" => Ok(Self::Person),
            "company" => Ok(Self::Company),
            _ => Err(format!("invalid contact kind: {s}")),
        }
    }
}

/// Fields shared by every identified contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactDetails {
    /// Database id.
    pub id: ContactId,
    /// Optional unique external identifier.
    pub identifier: Option<String>,
    /// Inactive contacts are hidden from everyone but all-seeing users.
    pub is_active: bool,
    /// Whether the contact agreed to receive marketing.
    pub marketing_permission: bool,
    /// Display name.
    pub name: String,
    pub prefix: String,
    pub suffix: String,
    /// Name extension (e.g. department).
    pub name_ext: String,
    pub email: String,
    pub phone: String,
    /// Website URL.
    pub www: String,
    /// Preferred language code; empty means the shop default.
    pub language: String,
    /// IANA timezone name.
    pub timezone: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ContactDetails {
    /// Details for a freshly created contact with everything else at defaults.
    #[must_use]
    pub fn new(id: ContactId, name: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            identifier: None,
            is_active: true,
            marketing_permission: true,
            name: name.into(),
            prefix: String::new(),
            suffix: String::new(),
            name_ext: String::new(),
            email: String::new(),
            phone: String::new(),
            www: String::new(),
            language: String::new(),
            timezone: None,
            created_at,
        }
    }
}

/// A private customer, usually linked to a user account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonContact {
    #[serde(flatten)]
    pub details: ContactDetails,
    /// Linked user account, if any.
    pub user_id: Option<UserId>,
    pub first_name: String,
    pub last_name: String,
    /// Set when the contact was loaded through a superuser account.
    #[serde(default)]
    pub is_all_seeing: bool,
}

impl PersonContact {
    /// Attach the account this contact was loaded through.
    ///
    /// All-seeing status is never stored; it follows the account's
    /// superuser flag.
    #[must_use]
    pub fn with_user(mut self, user: &User) -> Self {
        self.is_all_seeing = user.is_superuser;
        self
    }
}

/// A business customer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyContact {
    #[serde(flatten)]
    pub details: ContactDetails,
    /// VAT or other tax registration number.
    pub tax_number: String,
}

/// Values needed to create a person contact for a user account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPersonContact {
    pub user_id: UserId,
    pub name: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_active: bool,
}

impl NewPersonContact {
    /// Copy activation state, name and email from the account.
    #[must_use]
    pub fn from_user(user: &User) -> Self {
        Self {
            user_id: user.id,
            name: user.full_name(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            is_active: user.is_active,
        }
    }
}

/// A contact: anonymous, a person or a company.
///
/// Equality is identity based. All anonymous contacts are equal to each
/// other, and identified contacts are equal when kind and id match.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Contact {
    /// A visitor without an account. Has no id and is never persisted.
    #[default]
    Anonymous,
    Person(PersonContact),
    Company(CompanyContact),
}

impl Contact {
    #[must_use]
    pub const fn kind(&self) -> ContactKind {
        match self {
            Self::Anonymous => ContactKind::Anonymous,
            Self::Person(_) => ContactKind::Person,
            Self::Company(_) => ContactKind::Company,
        }
    }

    /// Shared fields, `None` for anonymous contacts.
    #[must_use]
    pub const fn details(&self) -> Option<&ContactDetails> {
        match self {
            Self::Anonymous => None,
            Self::Person(person) => Some(&person.details),
            Self::Company(company) => Some(&company.details),
        }
    }

    #[must_use]
    pub fn id(&self) -> Option<ContactId> {
        self.details().map(|d| d.id)
    }

    #[must_use]
    pub fn identifier(&self) -> Option<&str> {
        self.details().and_then(|d| d.identifier.as_deref())
    }

    #[must_use]
    pub const fn is_anonymous(&self) -> bool {
        matches!(self, Self::Anonymous)
    }

    /// Truthiness of a contact: false only for the anonymous contact.
    #[must_use]
    pub const fn is_present(&self) -> bool {
        !self.is_anonymous()
    }

    /// Whether the contact was loaded through a superuser account.
    #[must_use]
    pub const fn is_all_seeing(&self) -> bool {
        match self {
            Self::Person(person) => person.is_all_seeing,
            Self::Anonymous | Self::Company(_) => false,
        }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.details().is_none_or(|d| d.is_active)
    }

    #[must_use]
    pub fn marketing_permission(&self) -> bool {
        self.details().is_none_or(|d| d.marketing_permission)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.details().map_or("", |d| d.name.as_str())
    }

    #[must_use]
    pub fn prefix(&self) -> &str {
        self.details().map_or("", |d| d.prefix.as_str())
    }

    #[must_use]
    pub fn suffix(&self) -> &str {
        self.details().map_or("", |d| d.suffix.as_str())
    }

    #[must_use]
    pub fn name_ext(&self) -> &str {
        self.details().map_or("", |d| d.name_ext.as_str())
    }

    #[must_use]
    pub fn email(&self) -> &str {
        self.details().map_or("", |d| d.email.as_str())
    }

    #[must_use]
    pub fn phone(&self) -> &str {
        self.details().map_or("", |d| d.phone.as_str())
    }

    #[must_use]
    pub fn www(&self) -> &str {
        self.details().map_or("", |d| d.www.as_str())
    }

    #[must_use]
    pub fn language(&self) -> &str {
        self.details().map_or("", |d| d.language.as_str())
    }

    #[must_use]
    pub fn timezone(&self) -> Option<&str> {
        self.details().and_then(|d| d.timezone.as_deref())
    }

    /// Identifier of the default group this contact implicitly belongs to.
    #[must_use]
    pub const fn default_group_identifier(&self) -> &'static str {
        self.kind().default_group_identifier()
    }

    /// Whether the contact can be saved or deleted.
    #[must_use]
    pub const fn is_persistable(&self) -> bool {
        !self.is_anonymous()
    }

    /// Check that `operation` may be carried out on this contact.
    ///
    /// # Errors
    ///
    /// Returns `ContactError::UnsupportedOperation` for anonymous contacts.
    pub const fn ensure_persistable(&self, operation: ContactOperation) -> Result<(), ContactError> {
        if self.is_persistable() {
            Ok(())
        } else {
            Err(ContactError::UnsupportedOperation { operation })
        }
    }
}

impl PartialEq for Contact {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Anonymous, Self::Anonymous) => true,
            (Self::Person(a), Self::Person(b)) => a.details.id == b.details.id,
            (Self::Company(a), Self::Company(b)) => a.details.id == b.details.id,
            _ => false,
        }
    }
}

impl Eq for Contact {}

impl fmt::Display for Contact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn person(id: i64, user: &User) -> Contact {
        Contact::Person(
            PersonContact {
                details: ContactDetails::new(ContactId::new(id), user.full_name(), Utc::now()),
                user_id: Some(user.id),
                first_name: user.first_name.clone(),
                last_name: user.last_name.clone(),
                is_all_seeing: false,
            }
            .with_user(user),
        )
    }

    fn company(id: i64) -> Contact {
        Contact::Company(CompanyContact {
            details: ContactDetails::new(ContactId::new(id), "Acme Oy", Utc::now()),
            tax_number: "FI1234567".to_owned(),
        })
    }

    fn regular_user() -> User {
        let mut user = User::new(UserId::new(1), "joe@example.com");
        user.first_name = "Joe".to_owned();
        user.last_name = "Regular".to_owned();
        user
    }

    fn admin_user() -> User {
        let mut user = User::new(UserId::new(2), "admin@example.com");
        user.is_superuser = true;
        user
    }

    #[test]
    fn test_anonymous_contact_fields() {
        let a1 = Contact::Anonymous;

        assert_eq!(a1.identifier(), None);
        assert_eq!(a1.id(), None);
        assert!(a1.is_active());
        assert!(a1.marketing_permission());
        assert_eq!(a1.language(), "");
        assert_eq!(a1.phone(), "");
        assert_eq!(a1.www(), "");
        assert_eq!(a1.timezone(), None);
        assert_eq!(a1.prefix(), "");
        assert_eq!(a1.name(), "");
        assert_eq!(a1.suffix(), "");
        assert_eq!(a1.name_ext(), "");
        assert_eq!(a1.email(), "");
        assert_eq!(a1.to_string(), "");
        assert!(!a1.is_present());
        assert_eq!(a1.default_group_identifier(), "default_anonymous_group");
    }

    #[test]
    fn test_anonymous_contacts_are_equal() {
        assert_eq!(Contact::Anonymous, Contact::Anonymous);
        assert_eq!(Contact::default(), Contact::Anonymous);
    }

    #[test]
    fn test_anonymous_contact_cannot_be_persisted() {
        let anon = Contact::Anonymous;
        assert!(!anon.is_persistable());
        assert_eq!(
            anon.ensure_persistable(ContactOperation::Save),
            Err(ContactError::UnsupportedOperation {
                operation: ContactOperation::Save
            })
        );
        assert_eq!(
            anon.ensure_persistable(ContactOperation::Delete),
            Err(ContactError::UnsupportedOperation {
                operation: ContactOperation::Delete
            })
        );
        assert!(company(3).ensure_persistable(ContactOperation::Save).is_ok());
    }

    #[test]
    fn test_unsupported_operation_message() {
        let err = ContactError::UnsupportedOperation {
            operation: ContactOperation::Delete,
        };
        assert_eq!(
            err.to_string(),
            "delete is not supported for anonymous contacts"
        );
    }

    #[test]
    fn test_anonymous_contact_vs_person() {
        let anon = Contact::Anonymous;
        let person = person(1, &regular_user());
        assert_ne!(anon, person);
        assert_ne!(person, anon);
        assert!(person.is_present());
    }

    #[test]
    fn test_identified_contacts_compare_by_kind_and_id() {
        let user = regular_user();
        assert_eq!(person(1, &user), person(1, &user));
        assert_ne!(person(1, &user), person(2, &user));
        assert_ne!(person(1, &user), company(1));
    }

    #[test]
    fn test_omniscience() {
        assert!(person(1, &admin_user()).is_all_seeing());
        assert!(!person(2, &regular_user()).is_all_seeing());
        assert!(!company(3).is_all_seeing());
        assert!(!Contact::Anonymous.is_all_seeing());
    }

    #[test]
    fn test_anonymity() {
        assert!(!person(1, &admin_user()).is_anonymous());
        assert!(!company(3).is_anonymous());
        assert!(Contact::Anonymous.is_anonymous());
    }

    #[test]
    fn test_new_person_contact_from_user() {
        let mut user = regular_user();
        user.is_active = false;

        let new = NewPersonContact::from_user(&user);
        assert_eq!(new.user_id, user.id);
        assert_eq!(new.name, "Joe Regular");
        assert_eq!(new.email, "joe@example.com");
        assert!(!new.is_active);
    }

    #[test]
    fn test_display_uses_name() {
        assert_eq!(person(1, &regular_user()).to_string(), "Joe Regular");
        assert_eq!(company(3).to_string(), "Acme Oy");
    }

    #[test]
    fn test_kind_default_groups() {
        assert_eq!(
            ContactKind::Person.default_group_identifier(),
            "default_person_group"
        );
        assert_eq!(ContactKind::Company.default_group_name(), "Company Contacts");
        assert_eq!(
            ContactKind::from_default_group_identifier("default_company_group"),
            Some(ContactKind::Company)
        );
        assert_eq!(ContactKind::from_default_group_identifier("vip"), None);
    }

    #[test]
    fn test_kind_from_str_roundtrip() {
        for kind in ContactKind::ALL {
            assert_eq!(kind.to_string().parse::<ContactKind>().unwrap(), kind);
        }
        assert!("robot".parse::<ContactKind>().is_err());
    }

    #[test]
    fn test_serde_tagged() {
        let json = serde_json::to_value(Contact::Anonymous).unwrap();
        assert_eq!(json, serde_json::json!({ "kind": "anonymous" }));

        let json = serde_json::to_value(company(3)).unwrap();
        assert_eq!(json["kind"], "company");
        assert_eq!(json["tax_number"], "FI1234567");
        assert_eq!(json["id"], 3);
    }
}
