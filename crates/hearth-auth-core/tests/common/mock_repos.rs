//! Mock repositories for testing

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use uuid::Uuid;

use hearth_db::{
    ChildRepository, ChildRow, CreateNannyToken, DbError, DbResult, NannyTokenRepository,
    NannyTokenRow, SubscriptionRepository, SubscriptionRow, UpsertSubscription, UsageRepository,
};
use hearth_types::SubscriptionStatus;

/// In-memory nanny token repository for testing
#[derive(Default, Clone)]
pub struct MockNannyTokenRepository {
    tokens: Arc<DashMap<String, NannyTokenRow>>,
}

impl MockNannyTokenRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Force a stored token's expiry into the past
    pub fn expire_token(&self, token_hash: &str) {
        if let Some(mut row) = self.tokens.get_mut(token_hash) {
            row.expires_at = Utc::now() - chrono::Duration::hours(2);
        }
    }
}

#[async_trait]
impl NannyTokenRepository for MockNannyTokenRepository {
    async fn create(&self, token: CreateNannyToken) -> DbResult<NannyTokenRow> {
        let row = NannyTokenRow {
            id: token.id,
            household_id: token.household_id,
            token_hash: token.token_hash.clone(),
            created_at: Utc::now(),
            expires_at: token.expires_at,
            used: false,
            used_at: None,
        };
        self.tokens.insert(token.token_hash, row.clone());
        Ok(row)
    }

    async fn consume(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> DbResult<Option<NannyTokenRow>> {
        // Mirrors the conditional UPDATE: check and flip under the map's
        // per-entry lock.
        if let Some(mut row) = self.tokens.get_mut(token_hash) {
            if !row.used && row.expires_at > now {
                row.used = true;
                row.used_at = Some(now);
                return Ok(Some(row.clone()));
            }
        }
        Ok(None)
    }

    async fn find_by_hash(&self, token_hash: &str) -> DbResult<Option<NannyTokenRow>> {
        Ok(self.tokens.get(token_hash).map(|r| r.value().clone()))
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> DbResult<u64> {
        let before = self.tokens.len();
        self.tokens.retain(|_, row| row.expires_at > now);
        Ok((before - self.tokens.len()) as u64)
    }
}

/// In-memory child repository for testing
#[derive(Default, Clone)]
pub struct MockChildRepository {
    children: Arc<DashMap<Uuid, ChildRow>>,
}

impl MockChildRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_child(&self, child: ChildRow) {
        self.children.insert(child.id, child);
    }

    /// Build a test child bound to a household with the given PIN hash
    pub fn test_child(household_id: Uuid, name: &str, pin_hash: &str) -> ChildRow {
        ChildRow {
            id: Uuid::new_v4(),
            household_id,
            display_name: name.to_string(),
            avatar_url: None,
            pin_hash: pin_hash.to_string(),
            device_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }
}

#[async_trait]
impl ChildRepository for MockChildRepository {
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<ChildRow>> {
        Ok(self.children.get(&id).map(|r| r.value().clone()))
    }

    async fn find_by_pin_hash(
        &self,
        household_id: Uuid,
        pin_hash: &str,
    ) -> DbResult<Option<ChildRow>> {
        Ok(self
            .children
            .iter()
            .find(|r| r.household_id == household_id && r.pin_hash == pin_hash)
            .map(|r| r.value().clone()))
    }

    async fn find_by_device_id(&self, device_id: &str) -> DbResult<Option<ChildRow>> {
        Ok(self
            .children
            .iter()
            .find(|r| r.device_id.as_deref() == Some(device_id))
            .map(|r| r.value().clone()))
    }

    async fn update_pin_hash(&self, id: Uuid, pin_hash: &str) -> DbResult<()> {
        if let Some(mut child) = self.children.get_mut(&id) {
            child.pin_hash = pin_hash.to_string();
            child.updated_at = Utc::now();
        }
        Ok(())
    }
}

/// In-memory subscription repository for testing, keyed by household
#[derive(Default, Clone)]
pub struct MockSubscriptionRepository {
    subs: Arc<DashMap<Uuid, SubscriptionRow>>,
}

impl MockSubscriptionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn row_count(&self) -> usize {
        self.subs.len()
    }

    pub fn insert_row(&self, row: SubscriptionRow) {
        self.subs.insert(row.household_id, row);
    }

    /// Build a bare free-plan row for a household
    pub fn free_row(household_id: Uuid) -> SubscriptionRow {
        SubscriptionRow {
            id: Uuid::new_v4(),
            household_id,
            plan: "free".to_string(),
            status: SubscriptionStatus::Active,
            is_active: true,
            trial_end_date: None,
            subscription_start_date: None,
            subscription_end_date: None,
            stripe_customer_id: None,
            stripe_subscription_id: None,
            canceled_at: None,
            refunded_at: None,
            refund_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }
}

#[async_trait]
impl SubscriptionRepository for MockSubscriptionRepository {
    async fn find_by_household(&self, household_id: Uuid) -> DbResult<Option<SubscriptionRow>> {
        Ok(self.subs.get(&household_id).map(|r| r.value().clone()))
    }

    async fn find_by_stripe_subscription_id(
        &self,
        stripe_id: &str,
    ) -> DbResult<Option<SubscriptionRow>> {
        Ok(self
            .subs
            .iter()
            .find(|r| r.stripe_subscription_id.as_deref() == Some(stripe_id))
            .map(|r| r.value().clone()))
    }

    async fn find_by_stripe_customer_id(
        &self,
        customer_id: &str,
    ) -> DbResult<Option<SubscriptionRow>> {
        Ok(self
            .subs
            .iter()
            .find(|r| r.stripe_customer_id.as_deref() == Some(customer_id))
            .map(|r| r.value().clone()))
    }

    async fn ensure_default(&self, household_id: Uuid) -> DbResult<()> {
        self.subs
            .entry(household_id)
            .or_insert_with(|| Self::free_row(household_id));
        Ok(())
    }

    async fn upsert_from_provider(&self, sub: UpsertSubscription) -> DbResult<SubscriptionRow> {
        let mut row = self
            .subs
            .entry(sub.household_id)
            .or_insert_with(|| Self::free_row(sub.household_id));
        row.plan = sub.plan.clone();
        row.status = SubscriptionStatus::Active;
        row.is_active = true;
        row.stripe_customer_id = Some(sub.stripe_customer_id.clone());
        row.stripe_subscription_id = Some(sub.stripe_subscription_id.clone());
        row.subscription_start_date = Some(sub.subscription_start_date);
        row.subscription_end_date = Some(sub.subscription_end_date);
        row.updated_at = Utc::now();
        Ok(row.clone())
    }

    async fn update_stripe_customer_id(
        &self,
        household_id: Uuid,
        customer_id: &str,
    ) -> DbResult<()> {
        if let Some(mut row) = self.subs.get_mut(&household_id) {
            row.stripe_customer_id = Some(customer_id.to_string());
            row.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn mark_canceled(&self, id: Uuid, refund_id: Option<&str>) -> DbResult<()> {
        let mut found = false;
        for mut row in self.subs.iter_mut() {
            if row.id == id {
                row.status = SubscriptionStatus::Canceled;
                row.is_active = false;
                row.canceled_at = Some(Utc::now());
                if let Some(refund) = refund_id {
                    row.refund_id = Some(refund.to_string());
                    row.refunded_at = Some(Utc::now());
                }
                row.updated_at = Utc::now();
                found = true;
                break;
            }
        }
        if found {
            Ok(())
        } else {
            Err(DbError::NotFound)
        }
    }
}

/// In-memory usage counter with injectable failure
#[derive(Default, Clone)]
pub struct MockUsageRepository {
    pub bills: Arc<DashMap<Uuid, i64>>,
    pub events: Arc<DashMap<Uuid, i64>>,
    pub members: Arc<DashMap<Uuid, i64>>,
    fail: Arc<AtomicBool>,
}

impl MockUsageRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every counting call fail (fail-open tests)
    pub fn set_failing(&self, failing: bool) {
        self.fail.store(failing, Ordering::SeqCst);
    }

    fn check_failure(&self) -> DbResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            Err(DbError::NotFound)
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl UsageRepository for MockUsageRepository {
    async fn count_bills_since(&self, household_id: Uuid, _since: DateTime<Utc>) -> DbResult<i64> {
        self.check_failure()?;
        Ok(self.bills.get(&household_id).map(|c| *c).unwrap_or(0))
    }

    async fn count_events_since(&self, household_id: Uuid, _since: DateTime<Utc>) -> DbResult<i64> {
        self.check_failure()?;
        Ok(self.events.get(&household_id).map(|c| *c).unwrap_or(0))
    }

    async fn count_members(&self, household_id: Uuid) -> DbResult<i64> {
        self.check_failure()?;
        Ok(self.members.get(&household_id).map(|c| *c).unwrap_or(0))
    }
}
