//! Feature access gating and plan limits

use serde::{Deserialize, Serialize};

use crate::PlanType;

/// Gated product features
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    /// Shared family calendar
    BasicCalendar,
    /// Bill tracking
    BasicBills,
    /// Household notes
    BasicNotes,
    /// Chore assignments
    Chores,
    /// Point rewards for completed chores
    Rewards,
    /// Family messaging
    Messages,
    /// Nanny/caregiver access via one-time tokens
    NannyAccess,
    /// Child accounts with PIN login
    ChildAccounts,
    /// Recurring bill schedules
    RecurringBills,
}

impl Feature {
    /// All known features, for exhaustive checks
    pub const ALL: [Feature; 9] = [
        Self::BasicCalendar,
        Self::BasicBills,
        Self::BasicNotes,
        Self::Chores,
        Self::Rewards,
        Self::Messages,
        Self::NannyAccess,
        Self::ChildAccounts,
        Self::RecurringBills,
    ];

    /// Wire name of this feature
    pub const fn name(&self) -> &'static str {
        match self {
            Self::BasicCalendar => "basic_calendar",
            Self::BasicBills => "basic_bills",
            Self::BasicNotes => "basic_notes",
            Self::Chores => "chores",
            Self::Rewards => "rewards",
            Self::Messages => "messages",
            Self::NannyAccess => "nanny_access",
            Self::ChildAccounts => "child_accounts",
            Self::RecurringBills => "recurring_bills",
        }
    }
}

impl std::fmt::Display for Feature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for Feature {
    type Err = FeatureParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.name() == s)
            .ok_or_else(|| FeatureParseError(s.to_string()))
    }
}

/// Error parsing a feature name
#[derive(Debug, Clone)]
pub struct FeatureParseError(pub String);

impl std::fmt::Display for FeatureParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown feature: {}", self.0)
    }
}

impl std::error::Error for FeatureParseError {}

/// Features available on the free plan without an active trial
pub const FREE_FEATURES: [Feature; 3] = [
    Feature::BasicCalendar,
    Feature::BasicBills,
    Feature::BasicNotes,
];

/// Check whether a plan grants access to a feature.
///
/// An active trial grants full pro access regardless of the stored plan.
pub fn has_access(plan: PlanType, feature: Feature, is_trial_active: bool) -> bool {
    if is_trial_active {
        return true;
    }
    match plan {
        PlanType::Pro | PlanType::ProAnnual => true,
        PlanType::Free => FREE_FEATURES.contains(&feature),
    }
}

/// Sentinel meaning "no cap" for a numeric limit
pub const UNLIMITED: i64 = -1;

/// Numeric per-plan limits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanLimits {
    /// Bills per calendar month
    pub bills_per_month: i64,
    /// Calendar events per calendar month
    pub events_per_month: i64,
    /// Total household members
    pub household_members: i64,
}

impl PlanLimits {
    const FREE: Self = Self {
        bills_per_month: 10,
        events_per_month: 20,
        household_members: 6,
    };

    const UNCAPPED: Self = Self {
        bills_per_month: UNLIMITED,
        events_per_month: UNLIMITED,
        household_members: UNLIMITED,
    };

    /// Resolve limits for a plan and trial state
    pub const fn for_plan(plan: PlanType, is_trial_active: bool) -> Self {
        if is_trial_active {
            return Self::UNCAPPED;
        }
        match plan {
            PlanType::Pro | PlanType::ProAnnual => Self::UNCAPPED,
            PlanType::Free => Self::FREE,
        }
    }

    /// Limit for a specific countable resource
    pub const fn limit_for(&self, resource: ResourceKind) -> i64 {
        match resource {
            ResourceKind::Bill => self.bills_per_month,
            ResourceKind::Event => self.events_per_month,
            ResourceKind::Member => self.household_members,
        }
    }
}

/// Countable resources subject to plan limits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// A bill record
    Bill,
    /// A calendar event
    Event,
    /// A household member
    Member,
}

impl std::str::FromStr for ResourceKind {
    type Err = FeatureParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bill" => Ok(Self::Bill),
            "event" => Ok(Self::Event),
            "member" => Ok(Self::Member),
            _ => Err(FeatureParseError(s.to_string())),
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bill => write!(f, "bill"),
            Self::Event => write!(f, "event"),
            Self::Member => write!(f, "member"),
        }
    }
}
