//! Payment provider abstraction

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{BillingError, BillingInterval};

/// Provider-side customer
#[derive(Debug, Clone)]
pub struct ProviderCustomer {
    /// Opaque customer id
    pub id: String,
    /// Contact email
    pub email: Option<String>,
}

/// Provider-side subscription, reduced to what the synchronizer needs
#[derive(Debug, Clone)]
pub struct ProviderSubscription {
    /// Opaque subscription id
    pub id: String,
    /// Owning customer id
    pub customer_id: String,
    /// Current period start
    pub current_period_start: DateTime<Utc>,
    /// Current period end
    pub current_period_end: DateTime<Utc>,
    /// Price amount in cents
    pub amount_cents: i64,
    /// Billing interval
    pub interval: BillingInterval,
}

/// Provider-side invoice
#[derive(Debug, Clone)]
pub struct ProviderInvoice {
    /// Opaque invoice id
    pub id: String,
    /// Charge backing the invoice, if one exists
    pub charge_id: Option<String>,
    /// Amount paid in cents
    pub amount_paid: i64,
}

/// Issued refund
#[derive(Debug, Clone)]
pub struct ProviderRefund {
    /// Opaque refund id
    pub id: String,
}

/// Checkout session handed back to the client for redirect
#[derive(Debug, Clone)]
pub struct CheckoutSession {
    /// Session id
    pub session_id: String,
    /// Hosted checkout URL
    pub url: String,
}

/// Payment provider trait
///
/// Abstracts the payment processor so the billing service can be exercised
/// against a mock in tests.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Find a customer by contact email
    async fn find_customer_by_email(
        &self,
        email: &str,
    ) -> Result<Option<ProviderCustomer>, BillingError>;

    /// Create a customer
    async fn create_customer(&self, email: &str) -> Result<ProviderCustomer, BillingError>;

    /// List a customer's active subscriptions
    async fn list_active_subscriptions(
        &self,
        customer_id: &str,
    ) -> Result<Vec<ProviderSubscription>, BillingError>;

    /// Most recent paid invoice for a subscription, if any
    async fn latest_paid_invoice(
        &self,
        subscription_id: &str,
    ) -> Result<Option<ProviderInvoice>, BillingError>;

    /// Refund a charge in full
    async fn create_refund(&self, charge_id: &str) -> Result<ProviderRefund, BillingError>;

    /// Cancel a subscription immediately
    async fn cancel_subscription(&self, subscription_id: &str) -> Result<(), BillingError>;

    /// Create a hosted checkout session for a price
    async fn create_checkout_session(
        &self,
        customer_id: &str,
        price_id: &str,
        success_url: &str,
        cancel_url: &str,
    ) -> Result<CheckoutSession, BillingError>;
}
