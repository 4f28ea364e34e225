//! Repository traits
//!
//! Define async repository interfaces for database operations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::DbResult;
use crate::models::*;

/// Subscription repository trait
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Find the subscription for a household
    async fn find_by_household(&self, household_id: Uuid) -> DbResult<Option<SubscriptionRow>>;

    /// Find a subscription by Stripe subscription ID
    async fn find_by_stripe_subscription_id(
        &self,
        stripe_id: &str,
    ) -> DbResult<Option<SubscriptionRow>>;

    /// Find a subscription by Stripe customer ID
    async fn find_by_stripe_customer_id(
        &self,
        customer_id: &str,
    ) -> DbResult<Option<SubscriptionRow>>;

    /// Create a free-plan row if the household has none. Idempotent.
    async fn ensure_default(&self, household_id: Uuid) -> DbResult<()>;

    /// Upsert the household's subscription from provider state.
    ///
    /// Keyed by household, so concurrent sync calls cannot create a
    /// duplicate row.
    async fn upsert_from_provider(&self, sub: UpsertSubscription) -> DbResult<SubscriptionRow>;

    /// Refresh only the stored Stripe customer ID
    async fn update_stripe_customer_id(
        &self,
        household_id: Uuid,
        customer_id: &str,
    ) -> DbResult<()>;

    /// Mark a subscription canceled, recording the refund if one was issued
    async fn mark_canceled(&self, id: Uuid, refund_id: Option<&str>) -> DbResult<()>;
}

/// Provider-derived subscription upsert input
#[derive(Debug, Clone)]
pub struct UpsertSubscription {
    pub household_id: Uuid,
    pub plan: String,
    pub stripe_customer_id: String,
    pub stripe_subscription_id: String,
    pub subscription_start_date: DateTime<Utc>,
    pub subscription_end_date: DateTime<Utc>,
}

/// Nanny token repository trait
#[async_trait]
pub trait NannyTokenRepository: Send + Sync {
    /// Persist a new token
    async fn create(&self, token: CreateNannyToken) -> DbResult<NannyTokenRow>;

    /// Atomically consume an unused, unexpired token.
    ///
    /// The "not yet consumed" check and the "mark consumed" write are one
    /// conditional update, so two concurrent callers cannot both succeed.
    /// Returns `None` when the token is absent, expired, or already used.
    async fn consume(&self, token_hash: &str, now: DateTime<Utc>)
        -> DbResult<Option<NannyTokenRow>>;

    /// Look up a token by hash without consuming it (diagnostics only)
    async fn find_by_hash(&self, token_hash: &str) -> DbResult<Option<NannyTokenRow>>;

    /// Delete tokens past their expiry
    async fn delete_expired(&self, now: DateTime<Utc>) -> DbResult<u64>;
}

/// Create nanny token input
#[derive(Debug, Clone)]
pub struct CreateNannyToken {
    pub id: Uuid,
    pub household_id: Uuid,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
}

/// Child repository trait
#[async_trait]
pub trait ChildRepository: Send + Sync {
    /// Find a child by ID
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<ChildRow>>;

    /// Find a child by PIN hash, scoped to one household.
    ///
    /// The household scope is part of the lookup key: the same PIN may
    /// legitimately exist in different households.
    async fn find_by_pin_hash(
        &self,
        household_id: Uuid,
        pin_hash: &str,
    ) -> DbResult<Option<ChildRow>>;

    /// Find a child by registered device identifier
    async fn find_by_device_id(&self, device_id: &str) -> DbResult<Option<ChildRow>>;

    /// Update a child's PIN hash
    async fn update_pin_hash(&self, id: Uuid, pin_hash: &str) -> DbResult<()>;
}

/// Household repository trait
#[async_trait]
pub trait HouseholdRepository: Send + Sync {
    /// Find a household by ID
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<HouseholdRow>>;

    /// List every household (cron fan-out)
    async fn list_all(&self) -> DbResult<Vec<HouseholdRow>>;
}

/// Usage counting repository trait.
///
/// Counts rows in the wider application's tables; this crate does not own
/// those tables, only the counting queries the quota gate needs.
#[async_trait]
pub trait UsageRepository: Send + Sync {
    /// Bills created for a household since `since`
    async fn count_bills_since(&self, household_id: Uuid, since: DateTime<Utc>) -> DbResult<i64>;

    /// Events created for a household since `since`
    async fn count_events_since(&self, household_id: Uuid, since: DateTime<Utc>) -> DbResult<i64>;

    /// Current household member count
    async fn count_members(&self, household_id: Uuid) -> DbResult<i64>;
}
