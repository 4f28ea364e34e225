//! Entitlement snapshots
//!
//! An [`Entitlement`] is the resolved view of what a household is allowed to
//! do right now. It is always derived from stored subscription fields plus
//! the current time; the trial flag is never persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{has_access, Feature, PlanLimits, PlanType};

/// Resolved entitlement for a household
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entitlement {
    /// Effective plan
    pub plan: PlanType,
    /// Whether a trial window is currently open
    pub is_trial_active: bool,
    /// End of the trial window, if one was ever granted
    pub trial_end_date: Option<DateTime<Utc>>,
    /// End of the current paid period, if subscribed
    pub subscription_end_date: Option<DateTime<Utc>>,
}

impl Entitlement {
    /// Derive an entitlement from stored subscription fields.
    ///
    /// `is_trial_active` is computed here from `trial_end_date` against `now`
    /// so a stale stored flag can never grant or revoke access.
    pub fn from_stored(
        plan: PlanType,
        trial_end_date: Option<DateTime<Utc>>,
        subscription_end_date: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Self {
        let is_trial_active = trial_end_date.is_some_and(|end| now < end);
        Self {
            plan,
            is_trial_active,
            trial_end_date,
            subscription_end_date,
        }
    }

    /// The entitlement of a household with no subscription row.
    ///
    /// Absence of a row is a valid, common state, not an error.
    pub const fn free_default() -> Self {
        Self {
            plan: PlanType::Free,
            is_trial_active: false,
            trial_end_date: None,
            subscription_end_date: None,
        }
    }

    /// Whether this entitlement grants a feature
    pub fn allows(&self, feature: Feature) -> bool {
        has_access(self.plan, feature, self.is_trial_active)
    }

    /// Numeric limits for this entitlement
    pub fn limits(&self) -> PlanLimits {
        PlanLimits::for_plan(self.plan, self.is_trial_active)
    }
}
