//! Mock repository and payment provider for testing

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use dashmap::DashMap;
use uuid::Uuid;

use hearth_billing_core::{
    BillingError, BillingInterval, CheckoutSession, PaymentProvider, ProviderCustomer,
    ProviderInvoice, ProviderRefund, ProviderSubscription,
};
use hearth_db::{DbError, DbResult, SubscriptionRepository, SubscriptionRow, UpsertSubscription};
use hearth_types::SubscriptionStatus;

/// In-memory subscription repository, keyed by household
#[derive(Default, Clone)]
pub struct MockSubscriptionRepository {
    subs: Arc<DashMap<Uuid, SubscriptionRow>>,
    fail_mark_canceled: Arc<AtomicBool>,
}

impl MockSubscriptionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_row(&self, row: SubscriptionRow) {
        self.subs.insert(row.household_id, row);
    }

    pub fn get(&self, household_id: Uuid) -> Option<SubscriptionRow> {
        self.subs.get(&household_id).map(|r| r.value().clone())
    }

    /// Make `mark_canceled` fail (partial-failure tests)
    pub fn fail_mark_canceled(&self, failing: bool) {
        self.fail_mark_canceled.store(failing, Ordering::SeqCst);
    }

    /// Build a row on the given plan linked to provider IDs
    pub fn linked_row(
        household_id: Uuid,
        plan: &str,
        customer_id: &str,
        subscription_id: &str,
    ) -> SubscriptionRow {
        SubscriptionRow {
            id: Uuid::new_v4(),
            household_id,
            plan: plan.to_string(),
            status: SubscriptionStatus::Active,
            is_active: true,
            trial_end_date: None,
            subscription_start_date: Some(Utc::now() - Duration::days(10)),
            subscription_end_date: Some(Utc::now() + Duration::days(20)),
            stripe_customer_id: Some(customer_id.to_string()),
            stripe_subscription_id: Some(subscription_id.to_string()),
            canceled_at: None,
            refunded_at: None,
            refund_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    /// Build a bare free-plan row
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
        if self.fail_mark_canceled.load(Ordering::SeqCst) {
            return Err(DbError::NotFound);
        }
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
                return Ok(());
            }
        }
        Err(DbError::NotFound)
    }
}

/// In-memory payment provider with injectable failures
#[derive(Default, Clone)]
pub struct MockProvider {
    customers: Arc<DashMap<String, ProviderCustomer>>,
    subscriptions: Arc<DashMap<String, Vec<ProviderSubscription>>>,
    invoices: Arc<DashMap<String, ProviderInvoice>>,
    canceled: Arc<DashMap<String, ()>>,
    refund_count: Arc<AtomicUsize>,
    customers_created: Arc<AtomicUsize>,
    fail_all: Arc<AtomicBool>,
    fail_cancel: Arc<AtomicBool>,
    fail_refund: Arc<AtomicBool>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider customer for an email
    pub fn add_customer(&self, email: &str, customer_id: &str) {
        self.customers.insert(
            email.to_string(),
            ProviderCustomer {
                id: customer_id.to_string(),
                email: Some(email.to_string()),
            },
        );
    }

    /// Register an active subscription for a customer
    pub fn add_subscription(
        &self,
        customer_id: &str,
        subscription_id: &str,
        amount_cents: i64,
        interval: BillingInterval,
    ) {
        self.subscriptions
            .entry(customer_id.to_string())
            .or_default()
            .push(ProviderSubscription {
                id: subscription_id.to_string(),
                customer_id: customer_id.to_string(),
                current_period_start: Utc::now() - Duration::days(10),
                current_period_end: Utc::now() + Duration::days(20),
                amount_cents,
                interval,
            });
    }

    /// Register the latest paid invoice for a subscription
    pub fn add_invoice(&self, subscription_id: &str, invoice_id: &str, charge_id: Option<&str>) {
        self.invoices.insert(
            subscription_id.to_string(),
            ProviderInvoice {
                id: invoice_id.to_string(),
                charge_id: charge_id.map(str::to_string),
                amount_paid: 799,
            },
        );
    }

    pub fn was_canceled(&self, subscription_id: &str) -> bool {
        self.canceled.contains_key(subscription_id)
    }

    pub fn refund_count(&self) -> usize {
        self.refund_count.load(Ordering::SeqCst)
    }

    pub fn customers_created(&self) -> usize {
        self.customers_created.load(Ordering::SeqCst)
    }

    pub fn set_fail_all(&self, failing: bool) {
        self.fail_all.store(failing, Ordering::SeqCst);
    }

    pub fn set_fail_cancel(&self, failing: bool) {
        self.fail_cancel.store(failing, Ordering::SeqCst);
    }

    pub fn set_fail_refund(&self, failing: bool) {
        self.fail_refund.store(failing, Ordering::SeqCst);
    }

    fn check_all(&self) -> Result<(), BillingError> {
        if self.fail_all.load(Ordering::SeqCst) {
            Err(BillingError::ProviderError("provider unavailable".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl PaymentProvider for MockProvider {
    async fn find_customer_by_email(
        &self,
        email: &str,
    ) -> Result<Option<ProviderCustomer>, BillingError> {
        self.check_all()?;
        Ok(self.customers.get(email).map(|c| c.value().clone()))
    }

    async fn create_customer(&self, email: &str) -> Result<ProviderCustomer, BillingError> {
        self.check_all()?;
        self.customers_created.fetch_add(1, Ordering::SeqCst);
        let customer = ProviderCustomer {
            id: format!("cus_{}", Uuid::new_v4().simple()),
            email: Some(email.to_string()),
        };
        self.customers.insert(email.to_string(), customer.clone());
        Ok(customer)
    }

    async fn list_active_subscriptions(
        &self,
        customer_id: &str,
    ) -> Result<Vec<ProviderSubscription>, BillingError> {
        self.check_all()?;
        Ok(self
            .subscriptions
            .get(customer_id)
            .map(|s| s.value().clone())
            .unwrap_or_default())
    }

    async fn latest_paid_invoice(
        &self,
        subscription_id: &str,
    ) -> Result<Option<ProviderInvoice>, BillingError> {
        self.check_all()?;
        Ok(self
            .invoices
            .get(subscription_id)
            .map(|i| i.value().clone()))
    }

    async fn create_refund(&self, charge_id: &str) -> Result<ProviderRefund, BillingError> {
        self.check_all()?;
        if self.fail_refund.load(Ordering::SeqCst) {
            return Err(BillingError::ProviderError("refund failed".into()));
        }
        self.refund_count.fetch_add(1, Ordering::SeqCst);
        Ok(ProviderRefund {
            id: format!("re_for_{charge_id}"),
        })
    }

    async fn cancel_subscription(&self, subscription_id: &str) -> Result<(), BillingError> {
        self.check_all()?;
        if self.fail_cancel.load(Ordering::SeqCst) {
            return Err(BillingError::ProviderError("cancel failed".into()));
        }
        self.canceled.insert(subscription_id.to_string(), ());
        Ok(())
    }

    async fn create_checkout_session(
        &self,
        customer_id: &str,
        price_id: &str,
        success_url: &str,
        _cancel_url: &str,
    ) -> Result<CheckoutSession, BillingError> {
        self.check_all()?;
        Ok(CheckoutSession {
            session_id: format!("cs_{customer_id}_{price_id}"),
            url: format!("{success_url}#checkout"),
        })
    }
}
