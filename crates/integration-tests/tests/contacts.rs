//! Integration tests for contacts, contact groups and price display.
//!
//! These tests require a running `PostgreSQL` database reachable through
//! `SHOPKEEP_DATABASE_URL`.
//!
//! Run with: cargo test -p shopkeep-integration-tests -- --ignored

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use shopkeep_contacts::RepositoryError;
use shopkeep_contacts::db::contacts::NewCompanyContact;
use shopkeep_contacts::db::{ContactGroupRepository, ContactRepository};
use shopkeep_core::{
    Contact, ContactError, ContactGroup, ContactKind, ContactOperation, GroupPrecedence,
};
use shopkeep_integration_tests::{DEFAULT_GROUPS, TestContext, unique_identifier};

// ============================================================================
// Anonymity & Omniscience
// ============================================================================

#[tokio::test]
#[ignore = "Requires running PostgreSQL"]
async fn test_omniscience() {
    let ctx = TestContext::new().await;
    let admin = ctx.admin_user();
    let regular = ctx.regular_user();

    let admin_contact = ctx.service.person_contact_for(Some(&admin)).await.unwrap();
    let regular_contact = ctx.service.person_contact_for(Some(&regular)).await.unwrap();
    let nobody = ctx.service.person_contact_for(None).await.unwrap();

    assert!(admin_contact.is_all_seeing());
    assert!(!regular_contact.is_all_seeing());
    assert!(!nobody.is_all_seeing());
    assert!(!Contact::Anonymous.is_all_seeing());
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL"]
async fn test_anonymity() {
    let ctx = TestContext::new().await;
    let admin = ctx.admin_user();
    let regular = ctx.regular_user();

    assert!(!ctx.service.person_contact_for(Some(&admin)).await.unwrap().is_anonymous());
    assert!(!ctx.service.person_contact_for(Some(&regular)).await.unwrap().is_anonymous());
    assert!(ctx.service.person_contact_for(None).await.unwrap().is_anonymous());
    assert!(Contact::Anonymous.is_anonymous());
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL"]
async fn test_anonymous_contact_cannot_be_saved_or_deleted() {
    let ctx = TestContext::new().await;
    let contacts = ContactRepository::new(&ctx.pool);

    let saved = contacts.save(&Contact::Anonymous).await;
    assert!(matches!(
        saved,
        Err(RepositoryError::Contact(ContactError::UnsupportedOperation {
            operation: ContactOperation::Save
        }))
    ));

    let deleted = contacts.delete(&Contact::Anonymous).await;
    assert!(matches!(
        deleted,
        Err(RepositoryError::Contact(ContactError::UnsupportedOperation {
            operation: ContactOperation::Delete
        }))
    ));
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL"]
async fn test_anonymous_contact_groups() {
    let ctx = TestContext::new().await;

    let groups = ctx.service.groups(&Contact::Anonymous).await.unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(
        groups[0].identifier.as_deref(),
        Some(ContactKind::Anonymous.default_group_identifier())
    );
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL"]
async fn test_anonymous_contact_vs_person() {
    let ctx = TestContext::new().await;
    let user = ctx.regular_user();

    let anon = Contact::Anonymous;
    let person = ctx.service.person_contact_for(Some(&user)).await.unwrap();
    assert_ne!(anon, person);
    assert_ne!(person, anon);
}

// ============================================================================
// Person Contacts
// ============================================================================

#[tokio::test]
#[ignore = "Requires running PostgreSQL"]
async fn test_person_contact_creating_from_user() {
    let ctx = TestContext::new().await;
    let contacts = ContactRepository::new(&ctx.pool);

    let mut user = ctx.regular_user();
    user.first_name = "Joe".to_owned();
    user.last_name = "Regular".to_owned();

    // Preconditions
    assert!(!user.full_name().is_empty());
    assert!(contacts.get_person_by_user(user.id).await.unwrap().is_none());

    let person = ctx.service.person_contact_for(Some(&user)).await.unwrap();
    assert_eq!(person.is_active(), user.is_active);
    assert_eq!(person.name(), user.full_name());
    assert_eq!(person.email(), user.email);

    // Second lookup reuses the stored contact
    let again = ctx.service.person_contact_for(Some(&user)).await.unwrap();
    assert_eq!(again, person);
    assert!(again.id().is_some());
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL"]
async fn test_contact_save_and_delete() {
    let ctx = TestContext::new().await;
    let contacts = ContactRepository::new(&ctx.pool);
    let user = ctx.regular_user();

    let Contact::Person(mut person) = ctx.service.person_contact_for(Some(&user)).await.unwrap()
    else {
        panic!("expected a person contact");
    };
    person.details.phone = "+358 40 123 4567".to_owned();
    person.details.timezone = Some("Europe/Helsinki".to_owned());

    let contact = Contact::Person(person);
    contacts.save(&contact).await.unwrap();

    let id = contact.id().unwrap();
    let stored = contacts.get_by_id(id).await.unwrap().unwrap();
    assert_eq!(stored.phone(), "+358 40 123 4567");
    assert_eq!(stored.timezone(), Some("Europe/Helsinki"));

    contacts.delete(&stored).await.unwrap();
    assert!(contacts.get_by_id(id).await.unwrap().is_none());
    assert!(matches!(
        contacts.delete(&stored).await,
        Err(RepositoryError::NotFound)
    ));
}

// ============================================================================
// Default Groups
// ============================================================================

#[tokio::test]
#[ignore = "Requires running PostgreSQL"]
async fn test_default_contact_group_repr_and_str() {
    let _lock = DEFAULT_GROUPS.lock().await;
    let ctx = TestContext::new().await;

    let cases = [
        (ContactKind::Anonymous, "default_anonymous_group", "Anonymous Contacts"),
        (ContactKind::Company, "default_company_group", "Company Contacts"),
        (ContactKind::Person, "default_person_group", "Person Contacts"),
    ];

    for (kind, identifier, name) in cases {
        let group = ctx.service.default_group(kind).await.unwrap();
        let id = group.id.unwrap();
        assert_eq!(format!("{group:?}"), format!("<ContactGroup:{id}-{identifier}>"));
        assert_eq!(group.to_string(), name);
    }
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL"]
async fn test_default_group_is_singleton_per_kind() {
    let _lock = DEFAULT_GROUPS.lock().await;
    let ctx = TestContext::new().await;
    let groups = ContactGroupRepository::new(&ctx.pool);

    let first = groups.get_or_create_default(ContactKind::Company).await.unwrap();
    let second = groups.get_or_create_default(ContactKind::Company).await.unwrap();
    let cached = ctx.service.default_group(ContactKind::Company).await.unwrap();
    assert_eq!(first.id, second.id);
    assert_eq!(first.id, cached.id);

    let provisioned = ctx.service.provision_default_groups().await.unwrap();
    assert_eq!(provisioned.len(), 3);
    assert!(provisioned.iter().any(|g| g.id == first.id));

    let person = groups.get_or_create_default(ContactKind::Person).await.unwrap();
    assert_ne!(person.id, first.id);
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL"]
async fn test_deleted_default_group_is_recreated() {
    let _lock = DEFAULT_GROUPS.lock().await;
    let ctx = TestContext::new().await;
    let groups = ContactGroupRepository::new(&ctx.pool);

    let original = ctx.service.default_group(ContactKind::Company).await.unwrap();
    groups.delete(original.id.unwrap()).await.unwrap();

    let recreated = ctx.service.default_group(ContactKind::Company).await.unwrap();
    assert!(recreated.id.is_some());
    assert_ne!(recreated.id, original.id);
    assert_eq!(recreated.identifier, original.identifier);
    assert_eq!(recreated.name, original.name);
    assert_eq!(recreated.default_kind(), Some(ContactKind::Company));

    let cached = ctx.service.default_group(ContactKind::Company).await.unwrap();
    assert_eq!(cached.id, recreated.id);
}

// ============================================================================
// Price Display
// ============================================================================

#[tokio::test]
#[ignore = "Requires running PostgreSQL"]
async fn test_contact_group_price_display_options_filtering() {
    let ctx = TestContext::new().await;
    let groups = ContactGroupRepository::new(&ctx.pool);

    let create = |group: ContactGroup| {
        let groups = &groups;
        async move {
            groups
                .create(&group.with_identifier(unique_identifier("filtering")))
                .await
                .unwrap()
        }
    };

    let cg0 = create(ContactGroup::new()).await;
    let cg1 = create(ContactGroup::new().with_hide_prices(Some(true))).await;
    let cg2 = create(ContactGroup::new().with_hide_prices(Some(false))).await;
    let cg3 = create(ContactGroup::new().with_show_prices_including_taxes(Some(true))).await;
    let cg4 = create(ContactGroup::new().with_show_prices_including_taxes(Some(false))).await;

    let with_options = groups.with_price_display_options().await.unwrap();
    let contains = |group: &ContactGroup| with_options.iter().any(|g| g.id == group.id);

    assert!(!contains(&cg0));
    assert!(contains(&cg1));
    assert!(contains(&cg2));
    assert!(contains(&cg3));
    assert!(contains(&cg4));
    assert!(with_options.iter().all(ContactGroup::has_price_display_options));
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL"]
async fn test_contact_group_price_display_for_contact() {
    let _lock = DEFAULT_GROUPS.lock().await;
    let ctx = TestContext::new().await;
    let default_first = TestContext::with_precedence(GroupPrecedence::DefaultFirst).await;
    let groups = ContactGroupRepository::new(&ctx.pool);
    let contacts = ContactRepository::new(&ctx.pool);

    let default_group = ctx.reset_default_group(ContactKind::Person).await;

    let group = groups
        .create(
            &ContactGroup::new()
                .with_identifier(unique_identifier("hidden"))
                .with_hide_prices(Some(true)),
        )
        .await
        .unwrap();
    let user = ctx.regular_user();
    let person = ctx.service.person_contact_for(Some(&user)).await.unwrap();
    contacts
        .add_to_group(person.id().unwrap(), group.id.unwrap())
        .await
        .unwrap();

    let options = ctx.service.price_display_options(&person).await.unwrap();
    assert!(options.hide_prices());
    assert_eq!(options.include_taxes(), None);

    // Default group now has options of its own
    let mut default_group = default_group;
    default_group.show_prices_including_taxes = Some(true);
    groups.save(&default_group).await.unwrap();

    // Joined groups still win by default...
    let options = ctx.service.price_display_options(&person).await.unwrap();
    assert!(options.hide_prices());

    // ...while default-first precedence returns the default group's settings
    let default_options = default_first
        .service
        .price_display_options(&person)
        .await
        .unwrap();
    assert_eq!(default_options.include_taxes(), Some(true));
    assert!(!default_options.hide_prices());

    // Without the overriding membership the default group is the fallback
    assert!(
        contacts
            .remove_from_group(person.id().unwrap(), group.id.unwrap())
            .await
            .unwrap()
    );
    let options = ctx.service.price_display_options(&person).await.unwrap();
    assert_eq!(options.include_taxes(), Some(true));
    assert!(!options.hide_prices());

    ctx.reset_default_group(ContactKind::Person).await;
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL"]
async fn test_anonymous_price_display_uses_anonymous_default_group() {
    let _lock = DEFAULT_GROUPS.lock().await;
    let ctx = TestContext::new().await;
    let groups = ContactGroupRepository::new(&ctx.pool);

    let default_group = ctx.reset_default_group(ContactKind::Anonymous).await;
    let options = ctx
        .service
        .price_display_options(&Contact::Anonymous)
        .await
        .unwrap();
    assert!(options.show_prices());
    assert_eq!(options.include_taxes(), None);

    groups
        .set_price_display(default_group.id.unwrap(), Some(true), None)
        .await
        .unwrap();
    let options = ctx
        .service
        .price_display_options(&Contact::Anonymous)
        .await
        .unwrap();
    assert!(options.hide_prices());

    ctx.reset_default_group(ContactKind::Anonymous).await;
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL"]
async fn test_company_contact_price_display() {
    let _lock = DEFAULT_GROUPS.lock().await;
    let ctx = TestContext::new().await;
    let groups = ContactGroupRepository::new(&ctx.pool);
    let contacts = ContactRepository::new(&ctx.pool);

    let company = contacts
        .create_company(&NewCompanyContact {
            name: "Acme Oy".to_owned(),
            email: "sales@acme.example".to_owned(),
            tax_number: "FI1234567".to_owned(),
        })
        .await
        .unwrap();
    let company = Contact::Company(company);

    let group = groups
        .create(
            &ContactGroup::new()
                .with_identifier(unique_identifier("net_prices"))
                .with_show_prices_including_taxes(Some(false)),
        )
        .await
        .unwrap();
    contacts
        .add_to_group(company.id().unwrap(), group.id.unwrap())
        .await
        .unwrap();

    let options = ctx.service.price_display_options(&company).await.unwrap();
    assert_eq!(options.include_taxes(), Some(false));
    assert!(options.show_prices());

    let member_of = ctx.service.groups(&company).await.unwrap();
    assert_eq!(member_of.len(), 2);
    assert_eq!(member_of[0].default_kind(), Some(ContactKind::Company));
    assert_eq!(member_of[1].id, group.id);
}
