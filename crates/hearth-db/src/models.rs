//! Database row models
//!
//! These types map directly to database rows using SQLx's FromRow derive.

use chrono::{DateTime, Utc};
use hearth_types::SubscriptionStatus;
use sqlx::FromRow;
use uuid::Uuid;

/// Subscription row from the database.
///
/// At most one row exists per household (unique on `household_id`). Rows are
/// never hard-deleted; canceled subscriptions are retained for audit.
#[derive(Debug, Clone, FromRow)]
pub struct SubscriptionRow {
    pub id: Uuid,
    pub household_id: Uuid,
    pub plan: String,
    #[sqlx(try_from = "String")]
    pub status: SubscriptionStatus,
    pub is_active: bool,
    pub trial_end_date: Option<DateTime<Utc>>,
    pub subscription_start_date: Option<DateTime<Utc>>,
    pub subscription_end_date: Option<DateTime<Utc>>,
    pub stripe_customer_id: Option<String>,
    pub stripe_subscription_id: Option<String>,
    pub canceled_at: Option<DateTime<Utc>>,
    pub refunded_at: Option<DateTime<Utc>>,
    pub refund_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Nanny access token row.
///
/// The raw code is never stored, only its SHA-256 hash. A token verifies at
/// most once: consumption flips `used` in a single conditional update.
#[derive(Debug, Clone, FromRow)]
pub struct NannyTokenRow {
    pub id: Uuid,
    pub household_id: Uuid,
    pub token_hash: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub used: bool,
    pub used_at: Option<DateTime<Utc>>,
}

/// Child account row
#[derive(Debug, Clone, FromRow)]
pub struct ChildRow {
    pub id: Uuid,
    pub household_id: Uuid,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub pin_hash: String,
    pub device_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Household row
#[derive(Debug, Clone, FromRow)]
pub struct HouseholdRow {
    pub id: Uuid,
    pub name: String,
    pub owner_email: String,
    pub created_at: DateTime<Utc>,
}

impl ChildRow {
    /// Convert to the minimal identity payload returned at login
    pub fn identity(&self) -> hearth_types::ChildIdentity {
        hearth_types::ChildIdentity {
            id: hearth_types::ChildId(self.id),
            household_id: hearth_types::HouseholdId(self.household_id),
            display_name: self.display_name.clone(),
            avatar_url: self.avatar_url.clone(),
        }
    }
}
