//! Billing service
//!
//! Synchronizes provider subscription state into the local store and runs
//! the cancel-and-refund flow. The provider is the source of truth for paid
//! state; the local row is a cache the rest of the system reads.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument, warn};

use hearth_db::repo::{SubscriptionRepository, UpsertSubscription};
use hearth_types::{Entitlement, HouseholdId, PlanType, SubscriptionStatus};

use crate::config::BillingConfig;
use crate::error::BillingError;
use crate::provider::{CheckoutSession, PaymentProvider, ProviderCustomer};

/// Result of one synchronization pass
#[derive(Debug, Clone)]
pub struct SyncOutcome {
    /// Plan the household ended up on locally
    pub plan: PlanType,
    /// Provider subscription that backed the plan, if any
    pub stripe_subscription_id: Option<String>,
    /// Whether the local row was updated from provider state
    pub updated: bool,
}

/// Result of a completed cancel-and-refund
#[derive(Debug, Clone)]
pub struct CancelOutcome {
    /// Refund issued for the latest paid invoice, if one had a charge
    pub refund_id: Option<String>,
}

/// Billing service coordinating the payment provider and the local store
pub struct BillingService<R, P> {
    subscriptions: Arc<R>,
    provider: P,
    config: BillingConfig,
}

impl<R, P> BillingService<R, P>
where
    R: SubscriptionRepository,
    P: PaymentProvider,
{
    /// Create a new billing service
    pub fn new(subscriptions: Arc<R>, provider: P, config: BillingConfig) -> Self {
        Self {
            subscriptions,
            provider,
            config,
        }
    }

    /// Look up the provider customer for an email, creating one if absent
    async fn find_or_create_customer(&self, email: &str) -> Result<ProviderCustomer, BillingError> {
        if let Some(customer) = self.provider.find_customer_by_email(email).await? {
            return Ok(customer);
        }
        info!(email = %email, "No provider customer found, creating one");
        self.provider.create_customer(email).await
    }

    /// Synchronize a household's subscription from provider state.
    ///
    /// When the customer has an active subscription whose price maps to a
    /// known plan, the local row is upserted to that plan. When no active
    /// subscription exists, only the stored customer id is refreshed; the
    /// local plan is left untouched so a transient provider gap never
    /// downgrades a paying household.
    #[instrument(skip(self, email), fields(household_id = %household_id))]
    pub async fn sync(
        &self,
        household_id: HouseholdId,
        email: &str,
    ) -> Result<SyncOutcome, BillingError> {
        let customer = self.find_or_create_customer(email).await?;
        let subs = self.provider.list_active_subscriptions(&customer.id).await?;

        for sub in subs {
            let Some(plan) = self.config.plan_for_price(sub.amount_cents, sub.interval) else {
                warn!(
                    subscription_id = %sub.id,
                    amount_cents = sub.amount_cents,
                    "Active subscription price does not map to any plan, skipping"
                );
                continue;
            };

            let row = self
                .subscriptions
                .upsert_from_provider(UpsertSubscription {
                    household_id: household_id.0,
                    plan: plan.to_string(),
                    stripe_customer_id: customer.id.clone(),
                    stripe_subscription_id: sub.id.clone(),
                    subscription_start_date: sub.current_period_start,
                    subscription_end_date: sub.current_period_end,
                })
                .await?;

            info!(plan = %plan, subscription_id = %sub.id, "Synchronized subscription from provider");
            return Ok(SyncOutcome {
                plan,
                stripe_subscription_id: row.stripe_subscription_id,
                updated: true,
            });
        }

        // No usable active subscription. Keep whatever plan is stored.
        self.subscriptions
            .update_stripe_customer_id(household_id.0, &customer.id)
            .await?;

        let plan = self
            .subscriptions
            .find_by_household(household_id.0)
            .await?
            .map(|row| row.plan.parse().unwrap_or(PlanType::Free))
            .unwrap_or(PlanType::Free);

        Ok(SyncOutcome {
            plan,
            stripe_subscription_id: None,
            updated: false,
        })
    }

    /// Sync, then read the local row into an entitlement.
    ///
    /// Provider outages degrade to the stored row rather than failing the
    /// caller: entitlement reads must stay available when Stripe is not.
    #[instrument(skip(self, email), fields(household_id = %household_id))]
    pub async fn refresh_entitlement(
        &self,
        household_id: HouseholdId,
        email: &str,
    ) -> Result<Entitlement, BillingError> {
        match self.sync(household_id, email).await {
            Ok(_) => {}
            Err(e) if e.is_provider_error() => {
                warn!(error = %e, "Provider sync failed, serving stored entitlement");
            }
            Err(e) => return Err(e),
        }

        let now = Utc::now();
        let entitlement = self
            .subscriptions
            .find_by_household(household_id.0)
            .await?
            .map(|row| {
                let plan = row.plan.parse().unwrap_or(PlanType::Free);
                Entitlement::from_stored(plan, row.trial_end_date, row.subscription_end_date, now)
            })
            .unwrap_or_else(Entitlement::free_default);

        Ok(entitlement)
    }

    /// Create a hosted checkout session for upgrading to a paid plan
    #[instrument(skip(self, email), fields(household_id = %household_id, plan = %plan))]
    pub async fn create_checkout(
        &self,
        household_id: HouseholdId,
        email: &str,
        plan: PlanType,
        success_url: Option<&str>,
        cancel_url: Option<&str>,
    ) -> Result<CheckoutSession, BillingError> {
        let price_id = self
            .config
            .price_id(plan)
            .ok_or_else(|| BillingError::InvalidPlan(plan.to_string()))?
            .to_string();

        let customer = self.find_or_create_customer(email).await?;
        self.subscriptions
            .update_stripe_customer_id(household_id.0, &customer.id)
            .await?;

        let success_url = success_url.unwrap_or(&self.config.default_success_url);
        let cancel_url = cancel_url.unwrap_or(&self.config.default_cancel_url);

        let session = self
            .provider
            .create_checkout_session(&customer.id, &price_id, success_url, cancel_url)
            .await?;

        info!(session_id = %session.session_id, "Created checkout session");
        Ok(session)
    }

    /// Cancel a subscription and refund its latest paid invoice.
    ///
    /// Order of operations: refund first, then cancel at the provider, then
    /// mark the local row. A failure after the refund has been issued is
    /// surfaced as [`BillingError::Inconsistent`] carrying the refund id;
    /// callers must not retry it, since a retry would refund twice.
    #[instrument(skip(self), fields(household_id = %household_id))]
    pub async fn cancel_and_refund(
        &self,
        stripe_subscription_id: &str,
        household_id: HouseholdId,
    ) -> Result<CancelOutcome, BillingError> {
        let row = self
            .subscriptions
            .find_by_stripe_subscription_id(stripe_subscription_id)
            .await?
            .ok_or(BillingError::SubscriptionNotFound)?;

        if row.household_id != household_id.0 {
            warn!(
                subscription_id = %stripe_subscription_id,
                "Cancel attempted against a subscription owned by another household"
            );
            return Err(BillingError::OwnershipMismatch);
        }

        if row.status == SubscriptionStatus::Canceled {
            info!(
                subscription_id = %stripe_subscription_id,
                "Subscription already canceled, refusing repeat cancel"
            );
            return Err(BillingError::AlreadyCanceled);
        }

        let invoice = self
            .provider
            .latest_paid_invoice(stripe_subscription_id)
            .await?;

        let mut refund_id = None;
        match invoice {
            Some(inv) => match inv.charge_id {
                Some(charge) => {
                    let refund = self.provider.create_refund(&charge).await?;
                    info!(refund_id = %refund.id, charge_id = %charge, "Issued refund");
                    refund_id = Some(refund.id);
                }
                None => {
                    warn!(invoice_id = %inv.id, "Latest paid invoice has no charge, skipping refund");
                }
            },
            None => {
                info!("No paid invoice found, canceling without refund");
            }
        }

        // Refund is done. From here on, any failure leaves provider and
        // local state disagreeing and must go to an operator.
        if let Err(e) = self
            .provider
            .cancel_subscription(stripe_subscription_id)
            .await
        {
            return Err(BillingError::Inconsistent {
                refund_id,
                reason: format!("refund issued but provider cancel failed: {e}"),
            });
        }

        if let Err(e) = self
            .subscriptions
            .mark_canceled(row.id, refund_id.as_deref())
            .await
        {
            return Err(BillingError::Inconsistent {
                refund_id,
                reason: format!("provider canceled but local update failed: {e}"),
            });
        }

        info!(
            subscription_id = %stripe_subscription_id,
            refunded = refund_id.is_some(),
            "Subscription canceled"
        );
        Ok(CancelOutcome { refund_id })
    }
}
