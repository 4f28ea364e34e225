//! Subscription and child identity types

use serde::{Deserialize, Serialize};

use crate::{ChildId, HouseholdId};

/// Subscription record status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    /// Subscription is active (or the free default)
    Active,
    /// Subscription was canceled; the row is retained for audit
    Canceled,
}

impl std::fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Canceled => write!(f, "canceled"),
        }
    }
}

impl std::str::FromStr for SubscriptionStatus {
    type Err = StatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "canceled" => Ok(Self::Canceled),
            _ => Err(StatusParseError(s.to_string())),
        }
    }
}

// SQLx decodes status columns through this
impl TryFrom<String> for SubscriptionStatus {
    type Error = StatusParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Error parsing a subscription status
#[derive(Debug, Clone)]
pub struct StatusParseError(pub String);

impl std::fmt::Display for StatusParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid subscription status: {}", self.0)
    }
}

impl std::error::Error for StatusParseError {}

/// Minimal identity payload returned after a successful child login.
///
/// Deliberately excludes the PIN and any cross-household data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildIdentity {
    /// Child ID
    pub id: ChildId,
    /// Owning household
    pub household_id: HouseholdId,
    /// Display name shown on the child's home screen
    pub display_name: String,
    /// Avatar image URL, if set
    pub avatar_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_display_parse_roundtrip() {
        for status in [SubscriptionStatus::Active, SubscriptionStatus::Canceled] {
            let parsed: SubscriptionStatus = status.to_string().parse().unwrap();
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn test_status_try_from_rejects_unknown() {
        assert!(SubscriptionStatus::try_from("trialing".to_string()).is_err());
        assert!(SubscriptionStatus::try_from("".to_string()).is_err());
        assert_eq!(
            SubscriptionStatus::try_from("canceled".to_string()).unwrap(),
            SubscriptionStatus::Canceled
        );
    }
}
