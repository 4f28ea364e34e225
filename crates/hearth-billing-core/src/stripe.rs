//! Stripe payment provider implementation
//!
//! Raw REST client over `reqwest`; Stripe's API is form-encoded in, JSON
//! out, authenticated with the secret key via basic auth.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

use crate::config::{BillingConfig, BillingInterval};
use crate::error::BillingError;
use crate::provider::{
    CheckoutSession, PaymentProvider, ProviderCustomer, ProviderInvoice, ProviderRefund,
    ProviderSubscription,
};

const STRIPE_API_BASE: &str = "https://api.stripe.com/v1";

/// Stripe payment provider
#[derive(Clone)]
pub struct StripeProvider {
    client: Client,
    config: BillingConfig,
}

impl StripeProvider {
    /// Create a new Stripe provider with bounded timeouts.
    pub fn new(config: BillingConfig) -> Self {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(15))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { client, config }
    }

    /// Make an authenticated request to Stripe
    async fn stripe_request<T: for<'de> Deserialize<'de>>(
        &self,
        method: reqwest::Method,
        endpoint: &str,
        form: Option<&[(&str, &str)]>,
    ) -> Result<T, BillingError> {
        let url = format!("{STRIPE_API_BASE}{endpoint}");

        let mut request = self
            .client
            .request(method, &url)
            .basic_auth(&self.config.stripe_secret_key, Option::<&str>::None);

        if let Some(form_data) = form {
            request = request.form(form_data);
        }

        let response = request.send().await.map_err(|e| {
            error!(error = %e, "Stripe API request failed");
            BillingError::ProviderError(e.to_string())
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Stripe API error");
            return Err(BillingError::ProviderError(format!(
                "Stripe API error: {status}"
            )));
        }

        response.json::<T>().await.map_err(|e| {
            error!(error = %e, "Failed to parse Stripe response");
            BillingError::ProviderError(e.to_string())
        })
    }
}

#[async_trait]
impl PaymentProvider for StripeProvider {
    #[instrument(skip(self))]
    async fn find_customer_by_email(
        &self,
        email: &str,
    ) -> Result<Option<ProviderCustomer>, BillingError> {
        debug!(email = %email, "Searching Stripe customer by email");

        let form = [("email", email), ("limit", "1")];
        let list: StripeList<StripeCustomer> = self
            .stripe_request(reqwest::Method::GET, "/customers", Some(&form))
            .await?;

        Ok(list.data.into_iter().next().map(ProviderCustomer::from))
    }

    #[instrument(skip(self))]
    async fn create_customer(&self, email: &str) -> Result<ProviderCustomer, BillingError> {
        debug!(email = %email, "Creating Stripe customer");

        let form = [("email", email)];
        let customer: StripeCustomer = self
            .stripe_request(reqwest::Method::POST, "/customers", Some(&form))
            .await?;

        Ok(customer.into())
    }

    #[instrument(skip(self))]
    async fn list_active_subscriptions(
        &self,
        customer_id: &str,
    ) -> Result<Vec<ProviderSubscription>, BillingError> {
        debug!(customer_id = %customer_id, "Listing active Stripe subscriptions");

        let form = [("customer", customer_id), ("status", "active")];
        let list: StripeList<StripeSubscription> = self
            .stripe_request(reqwest::Method::GET, "/subscriptions", Some(&form))
            .await?;

        list.data
            .into_iter()
            .map(ProviderSubscription::try_from)
            .collect()
    }

    #[instrument(skip(self))]
    async fn latest_paid_invoice(
        &self,
        subscription_id: &str,
    ) -> Result<Option<ProviderInvoice>, BillingError> {
        debug!(subscription_id = %subscription_id, "Fetching latest paid invoice");

        let form = [
            ("subscription", subscription_id),
            ("status", "paid"),
            ("limit", "1"),
        ];
        let list: StripeList<StripeInvoice> = self
            .stripe_request(reqwest::Method::GET, "/invoices", Some(&form))
            .await?;

        Ok(list.data.into_iter().next().map(|inv| ProviderInvoice {
            id: inv.id,
            charge_id: inv.charge,
            amount_paid: inv.amount_paid,
        }))
    }

    #[instrument(skip(self))]
    async fn create_refund(&self, charge_id: &str) -> Result<ProviderRefund, BillingError> {
        debug!(charge_id = %charge_id, "Creating refund");

        let form = [("charge", charge_id)];
        let refund: StripeRefund = self
            .stripe_request(reqwest::Method::POST, "/refunds", Some(&form))
            .await?;

        Ok(ProviderRefund { id: refund.id })
    }

    #[instrument(skip(self))]
    async fn cancel_subscription(&self, subscription_id: &str) -> Result<(), BillingError> {
        debug!(subscription_id = %subscription_id, "Canceling subscription");

        let _: StripeSubscription = self
            .stripe_request(
                reqwest::Method::DELETE,
                &format!("/subscriptions/{subscription_id}"),
                None,
            )
            .await?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn create_checkout_session(
        &self,
        customer_id: &str,
        price_id: &str,
        success_url: &str,
        cancel_url: &str,
    ) -> Result<CheckoutSession, BillingError> {
        debug!(customer_id = %customer_id, "Creating checkout session");

        let form = [
            ("customer", customer_id),
            ("mode", "subscription"),
            ("success_url", success_url),
            ("cancel_url", cancel_url),
            ("line_items[0][price]", price_id),
            ("line_items[0][quantity]", "1"),
        ];

        let session: StripeCheckoutSession = self
            .stripe_request(reqwest::Method::POST, "/checkout/sessions", Some(&form))
            .await?;

        Ok(CheckoutSession {
            session_id: session.id,
            url: session.url.unwrap_or_default(),
        })
    }
}

impl std::fmt::Debug for StripeProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeProvider").finish_non_exhaustive()
    }
}

pub(crate) fn timestamp(ts: i64, field: &str) -> Result<DateTime<Utc>, BillingError> {
    Utc.timestamp_opt(ts, 0)
        .single()
        .ok_or_else(|| BillingError::ProviderError(format!("invalid timestamp in {field}")))
}

impl From<StripeCustomer> for ProviderCustomer {
    fn from(c: StripeCustomer) -> Self {
        Self {
            id: c.id,
            email: c.email,
        }
    }
}

impl TryFrom<StripeSubscription> for ProviderSubscription {
    type Error = BillingError;

    fn try_from(sub: StripeSubscription) -> Result<Self, BillingError> {
        let item = sub
            .items
            .data
            .into_iter()
            .next()
            .ok_or_else(|| BillingError::ProviderError("subscription has no items".to_string()))?;

        let amount_cents = item
            .price
            .unit_amount
            .ok_or_else(|| BillingError::ProviderError("price has no unit_amount".to_string()))?;

        let interval_str = item
            .price
            .recurring
            .map(|r| r.interval)
            .ok_or_else(|| BillingError::ProviderError("price is not recurring".to_string()))?;

        let interval = BillingInterval::parse(&interval_str).ok_or_else(|| {
            BillingError::ProviderError(format!("unknown billing interval: {interval_str}"))
        })?;

        Ok(Self {
            id: sub.id,
            customer_id: sub.customer,
            current_period_start: timestamp(sub.current_period_start, "current_period_start")?,
            current_period_end: timestamp(sub.current_period_end, "current_period_end")?,
            amount_cents,
            interval,
        })
    }
}

// Stripe API response types

/// Stripe customer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StripeCustomer {
    /// Customer ID
    pub id: String,
    /// Customer email
    pub email: Option<String>,
    /// Whether the customer is deleted
    #[serde(default)]
    pub deleted: bool,
}

/// Stripe subscription
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StripeSubscription {
    /// Subscription ID
    pub id: String,
    /// Customer ID
    pub customer: String,
    /// Subscription status
    pub status: String,
    /// Current period start (Unix timestamp)
    pub current_period_start: i64,
    /// Current period end (Unix timestamp)
    pub current_period_end: i64,
    /// Whether subscription cancels at period end
    #[serde(default)]
    pub cancel_at_period_end: bool,
    /// Subscription items (price lives here)
    #[serde(default)]
    pub items: StripeSubscriptionItemList,
}

/// Stripe subscription item list
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StripeSubscriptionItemList {
    /// Items
    #[serde(default)]
    pub data: Vec<StripeSubscriptionItem>,
}

/// Stripe subscription item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StripeSubscriptionItem {
    /// Item ID
    pub id: String,
    /// Price attached to the item
    pub price: StripePrice,
}

/// Stripe price
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StripePrice {
    /// Price ID
    pub id: String,
    /// Amount in cents
    pub unit_amount: Option<i64>,
    /// Recurrence, absent for one-off prices
    pub recurring: Option<StripeRecurring>,
}

/// Stripe price recurrence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StripeRecurring {
    /// Billing interval: "month" or "year"
    pub interval: String,
}

/// Stripe invoice
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StripeInvoice {
    /// Invoice ID
    pub id: String,
    /// Customer ID
    pub customer: String,
    /// Invoice status
    pub status: Option<String>,
    /// Backing charge, if paid by card
    pub charge: Option<String>,
    /// Amount paid in cents
    pub amount_paid: i64,
    /// Currency
    pub currency: String,
}

/// Stripe refund
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StripeRefund {
    /// Refund ID
    pub id: String,
    /// Refund status
    pub status: Option<String>,
}

/// Stripe checkout session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StripeCheckoutSession {
    /// Session ID
    pub id: String,
    /// Checkout URL
    pub url: Option<String>,
    /// Customer ID
    pub customer: Option<String>,
}

/// Stripe list response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StripeList<T> {
    /// List data
    pub data: Vec<T>,
    /// Whether there are more items
    #[serde(default)]
    pub has_more: bool,
}
