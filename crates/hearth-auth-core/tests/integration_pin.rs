//! Child PIN login tests
//!
//! The important property is household scoping: the same PIN may exist in
//! two households and must resolve to the child of the household asked for.

mod common;

use std::sync::Arc;

use common::mock_repos::MockChildRepository;
use hearth_auth_core::crypto::hash_secret;
use hearth_auth_core::{AuthError, ChildPinService};
use hearth_types::{ChildId, HouseholdId};
use uuid::Uuid;

#[tokio::test]
async fn pin_resolves_child_within_household() {
    let repo = Arc::new(MockChildRepository::new());
    let household = HouseholdId::new();
    let child = MockChildRepository::test_child(household.0, "Maya", &hash_secret("1234"));
    let child_id = child.id;
    repo.insert_child(child);

    let service = ChildPinService::new(repo);
    let identity = service.verify_pin(household, "1234").await.unwrap();
    assert_eq!(identity.id, ChildId(child_id));
    assert_eq!(identity.household_id, household);
    assert_eq!(identity.display_name, "Maya");
}

#[tokio::test]
async fn same_pin_in_two_households_resolves_separately() {
    let repo = Arc::new(MockChildRepository::new());
    let household_a = HouseholdId::new();
    let household_b = HouseholdId::new();

    let child_a = MockChildRepository::test_child(household_a.0, "Ada", &hash_secret("4321"));
    let child_b = MockChildRepository::test_child(household_b.0, "Ben", &hash_secret("4321"));
    let (id_a, id_b) = (child_a.id, child_b.id);
    repo.insert_child(child_a);
    repo.insert_child(child_b);

    let service = ChildPinService::new(repo);

    let a = service.verify_pin(household_a, "4321").await.unwrap();
    let b = service.verify_pin(household_b, "4321").await.unwrap();
    assert_eq!(a.id, ChildId(id_a));
    assert_eq!(b.id, ChildId(id_b));
    assert_ne!(a.id, b.id);
}

#[tokio::test]
async fn correct_pin_wrong_household_fails() {
    let repo = Arc::new(MockChildRepository::new());
    let household = HouseholdId::new();
    repo.insert_child(MockChildRepository::test_child(
        household.0,
        "Maya",
        &hash_secret("1234"),
    ));

    let service = ChildPinService::new(repo);
    let err = service
        .verify_pin(HouseholdId::new(), "1234")
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::InvalidCode));
}

#[tokio::test]
async fn wrong_pin_fails_generically() {
    let repo = Arc::new(MockChildRepository::new());
    let household = HouseholdId::new();
    repo.insert_child(MockChildRepository::test_child(
        household.0,
        "Maya",
        &hash_secret("1234"),
    ));

    let service = ChildPinService::new(repo);
    let err = service.verify_pin(household, "9999").await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidCode));
}

#[tokio::test]
async fn malformed_pin_rejected_without_lookup() {
    let repo = Arc::new(MockChildRepository::new());
    let service = ChildPinService::new(repo);

    for pin in ["abc", "12", "1234567"] {
        let err = service
            .verify_pin(HouseholdId::new(), pin)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCode));
    }
}

#[tokio::test]
async fn device_login_returns_identity() {
    let repo = Arc::new(MockChildRepository::new());
    let household = HouseholdId::new();
    let mut child = MockChildRepository::test_child(household.0, "Leo", &hash_secret("5555"));
    child.device_id = Some("tablet-kitchen".to_string());
    let child_id = child.id;
    repo.insert_child(child);

    let service = ChildPinService::new(repo);
    let identity = service.device_login("tablet-kitchen").await.unwrap();
    assert_eq!(identity.id, ChildId(child_id));
}

#[tokio::test]
async fn unknown_device_is_not_found() {
    let repo = Arc::new(MockChildRepository::new());
    let service = ChildPinService::new(repo);
    let err = service.device_login("no-such-device").await.unwrap_err();
    assert!(matches!(err, AuthError::DeviceNotRegistered));
}

#[tokio::test]
async fn set_pin_replaces_credential() {
    let repo = Arc::new(MockChildRepository::new());
    let household = HouseholdId::new();
    let child = MockChildRepository::test_child(household.0, "Maya", &hash_secret("1234"));
    let child_id = ChildId(child.id);
    repo.insert_child(child);

    let service = ChildPinService::new(repo);
    service.set_pin(child_id, "5678").await.unwrap();

    assert!(service.verify_pin(household, "1234").await.is_err());
    assert!(service.verify_pin(household, "5678").await.is_ok());
}

#[tokio::test]
async fn set_pin_enforces_format() {
    let repo = Arc::new(MockChildRepository::new());
    let service = ChildPinService::new(repo);
    let err = service
        .set_pin(ChildId(Uuid::new_v4()), "12ab")
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::InvalidPinFormat));
}
