//! Hearth Billing Core - Billing business logic
//!
//! Stripe synchronization, checkout, cancel-and-refund, and webhook
//! verification for household subscriptions.
//!
//! # Example
//!
//! ```rust,ignore
//! use hearth_billing_core::{BillingConfig, BillingService, StripeProvider};
//!
//! let config = BillingConfig::new("sk_test_...", "whsec_...")
//!     .with_price(PlanType::Pro, "price_...")
//!     .with_price(PlanType::ProAnnual, "price_...");
//!
//! let provider = StripeProvider::new(config.clone());
//! let billing = BillingService::new(subscriptions, provider, config);
//!
//! let outcome = billing.sync(household_id, "owner@example.com").await?;
//! ```

pub mod config;
pub mod error;
pub mod provider;
pub mod service;
pub mod stripe;
pub mod webhook;

pub use config::{BillingConfig, BillingInterval};
pub use error::BillingError;
pub use provider::{
    CheckoutSession, PaymentProvider, ProviderCustomer, ProviderInvoice, ProviderRefund,
    ProviderSubscription,
};
pub use service::{BillingService, CancelOutcome, SyncOutcome};
pub use stripe::StripeProvider;
pub use webhook::{WebhookEvent, WebhookEventType, WebhookHandler};
