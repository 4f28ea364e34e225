//! Application state for the household API service.

use std::sync::Arc;

use hearth_auth_core::{
    ChildPinService, EntitlementResolver, NannyTokenService, SessionSigner, UsageGate,
};
use hearth_billing_core::{BillingService, StripeProvider, WebhookHandler};
use hearth_db::pg::{
    PgChildRepository, PgNannyTokenRepository, PgSubscriptionRepository, PgUsageRepository,
    Repositories,
};
use hearth_db::DbPool;

use crate::config::Config;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Nanny one-time token issue/verify
    pub tokens: NannyTokenService<PgNannyTokenRepository>,
    /// Child PIN and device login
    pub pins: ChildPinService<PgChildRepository>,
    /// Entitlement resolution (cached)
    pub resolver: EntitlementResolver<PgSubscriptionRepository>,
    /// Usage quota gate
    pub gate: UsageGate<PgSubscriptionRepository, PgUsageRepository>,
    /// Stripe synchronization and cancel/refund
    pub billing: Arc<BillingService<PgSubscriptionRepository, StripeProvider>>,
    /// Stripe webhook verification
    pub webhooks: WebhookHandler,
    /// Session signing/verification
    pub signer: SessionSigner,
    /// Database repositories
    pub repos: Repositories,
    /// Database pool (readiness probe)
    pub pool: DbPool,
    /// Configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Wire up all services from a pool and configuration
    pub fn new(pool: DbPool, config: Config) -> Self {
        let repos = Repositories::new(pool.clone());

        let tokens = NannyTokenService::new(
            Arc::new(repos.nanny_tokens.clone()),
            config.auth.token_ttl,
            config.auth.token_length,
        );
        let pins = ChildPinService::new(Arc::new(repos.children.clone()));

        let subscriptions = Arc::new(repos.subscriptions.clone());
        let resolver = EntitlementResolver::new(subscriptions.clone());
        let gate = UsageGate::new(resolver.clone(), Arc::new(repos.usage.clone()));

        let provider = StripeProvider::new(config.billing.clone());
        let billing = Arc::new(BillingService::new(
            subscriptions,
            provider,
            config.billing.clone(),
        ));
        let webhooks = WebhookHandler::new(config.billing.stripe_webhook_secret.clone());
        let signer = SessionSigner::new(config.auth.session_key.clone());

        Self {
            tokens,
            pins,
            resolver,
            gate,
            billing,
            webhooks,
            signer,
            repos,
            pool,
            config: Arc::new(config),
        }
    }

    /// Get request timeout from config
    pub fn request_timeout(&self) -> std::time::Duration {
        self.config.request_timeout
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}
