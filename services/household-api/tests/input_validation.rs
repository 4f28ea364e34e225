//! Input validation tests
//!
//! Security-relevant validation at the API boundary: session strings, PIN
//! format, and the wire names accepted by the billing routes.

use std::time::Duration;

use uuid::Uuid;

use hearth_auth_core::crypto::HmacKey;
use hearth_auth_core::pin::validate_pin;
use hearth_auth_core::{AuthError, SessionPayload, SessionRole, SessionSigner};
use hearth_types::{HouseholdId, PlanType, ResourceKind};

fn signer() -> SessionSigner {
    SessionSigner::new(HmacKey::new([9u8; 32]).unwrap())
}

fn parent_session(signer: &SessionSigner) -> String {
    let payload = SessionPayload::new(
        Uuid::new_v4(),
        HouseholdId::new(),
        SessionRole::Parent,
        Duration::from_secs(3600),
    );
    signer.issue(&payload).unwrap()
}

// ============================================================================
// Session Strings
// ============================================================================

#[test]
fn test_session_roundtrip_preserves_role() {
    let signer = signer();
    let session = parent_session(&signer);
    let payload = signer.verify(&session).unwrap();
    assert_eq!(payload.role, SessionRole::Parent);
}

#[test]
fn test_garbage_session_strings_rejected() {
    let signer = signer();
    for input in [
        "",
        "no-dot-separator",
        "a.b.c",
        "!!!.###",
        "Zm9v.YmFy", // well-formed base64, wrong signature
    ] {
        assert!(
            matches!(signer.verify(input), Err(AuthError::InvalidSession)),
            "accepted {input:?}"
        );
    }
}

#[test]
fn test_truncated_session_rejected() {
    let signer = signer();
    let session = parent_session(&signer);
    let truncated = &session[..session.len() - 4];
    assert!(signer.verify(truncated).is_err());
}

#[test]
fn test_session_from_other_deployment_rejected() {
    // Same format, different signing secret
    let session = parent_session(&signer());
    let other = SessionSigner::new(HmacKey::new([10u8; 32]).unwrap());
    assert!(matches!(
        other.verify(&session),
        Err(AuthError::InvalidSession)
    ));
}

// ============================================================================
// PIN Format
// ============================================================================

#[test]
fn test_pin_policy_accepts_four_to_six_digits() {
    for pin in ["0000", "12345", "999999"] {
        assert!(validate_pin(pin).is_ok());
    }
}

#[test]
fn test_pin_policy_rejects_injection_shaped_input() {
    for pin in [
        "",
        "123",
        "1234567",
        "12a4",
        "12 34",
        "1234\n",
        "'; --",
        "١٢٣٤", // non-ASCII digits
    ] {
        assert!(validate_pin(pin).is_err(), "accepted {pin:?}");
    }
}

// ============================================================================
// Wire Names
// ============================================================================

#[test]
fn test_plan_wire_names() {
    assert_eq!("pro".parse::<PlanType>().unwrap(), PlanType::Pro);
    assert_eq!(
        "pro_annual".parse::<PlanType>().unwrap(),
        PlanType::ProAnnual
    );
    assert_eq!("free".parse::<PlanType>().unwrap(), PlanType::Free);

    // Parsing is case-insensitive for stored values
    assert_eq!("PRO".parse::<PlanType>().unwrap(), PlanType::Pro);

    for input in ["", "premium", "pro annual", "' OR 1=1 --"] {
        assert!(input.parse::<PlanType>().is_err(), "accepted {input:?}");
    }
}

#[test]
fn test_resource_wire_names() {
    assert_eq!("bill".parse::<ResourceKind>().unwrap(), ResourceKind::Bill);
    assert_eq!(
        "event".parse::<ResourceKind>().unwrap(),
        ResourceKind::Event
    );
    assert_eq!(
        "member".parse::<ResourceKind>().unwrap(),
        ResourceKind::Member
    );

    for input in ["", "bills", "Bill", "../../etc/passwd"] {
        assert!(input.parse::<ResourceKind>().is_err(), "accepted {input:?}");
    }
}

// ============================================================================
// Household IDs
// ============================================================================

#[test]
fn test_household_id_parsing() {
    let uuid = "550e8400-e29b-41d4-a716-446655440000";
    assert!(Uuid::parse_str(uuid).is_ok());

    for id in ["", "not-a-uuid", "550e8400-e29b-41d4-a716", "' OR 1=1 --"] {
        assert!(Uuid::parse_str(id).is_err(), "accepted {id:?}");
    }
}
