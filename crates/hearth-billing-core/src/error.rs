//! Billing errors

use thiserror::Error;

/// Billing errors
#[derive(Error, Debug)]
pub enum BillingError {
    /// Subscription not found
    #[error("subscription not found")]
    SubscriptionNotFound,

    /// Caller does not own the subscription
    #[error("subscription does not belong to household")]
    OwnershipMismatch,

    /// Subscription is already canceled locally. A repeat cancel would
    /// issue a second refund, so it is rejected up front.
    #[error("subscription already canceled")]
    AlreadyCanceled,

    /// No checkout price configured for the requested plan
    #[error("no price configured for plan: {0}")]
    InvalidPlan(String),

    /// Payment provider call failed or returned an unexpected shape
    #[error("provider error: {0}")]
    ProviderError(String),

    /// Webhook verification or parsing error
    #[error("webhook error: {0}")]
    WebhookError(String),

    /// A multi-step provider operation failed partway through.
    ///
    /// Provider-side and local state now disagree and must be reconciled by
    /// an operator. Never auto-retried: an already-issued refund must not be
    /// issued twice.
    #[error("provider state inconsistent, manual reconciliation required (refund_id={refund_id:?}): {reason}")]
    Inconsistent {
        /// Refund issued before the failure, if any
        refund_id: Option<String>,
        /// What failed
        reason: String,
    },

    /// Database error
    #[error("database error: {0}")]
    Database(#[from] hearth_db::DbError),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

impl BillingError {
    /// Whether this error came from the payment provider boundary
    pub fn is_provider_error(&self) -> bool {
        matches!(self, Self::ProviderError(_))
    }

    /// Whether this error requires manual reconciliation
    pub fn is_inconsistent(&self) -> bool {
        matches!(self, Self::Inconsistent { .. })
    }
}
