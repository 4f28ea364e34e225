//! Configuration for the household API service.

use std::time::Duration;

use hearth_auth_core::AuthConfig;
use hearth_billing_core::BillingConfig;
use hearth_types::PlanType;

/// Household API configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub http_port: u16,
    /// Database URL
    pub database_url: String,
    /// Auth core configuration (session signing, token lifetimes)
    pub auth: AuthConfig,
    /// Billing core configuration
    pub billing: BillingConfig,
    /// Shared secret guarding the internal cron routes
    pub cron_secret: String,
    /// Request timeout
    pub request_timeout: Duration,
    /// Metrics enabled
    pub metrics_enabled: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url =
            std::env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;

        let http_port = std::env::var("HTTP_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .map_err(|_| ConfigError::Invalid("HTTP_PORT"))?;

        // Session signing
        let session_secret =
            std::env::var("SESSION_SECRET").map_err(|_| ConfigError::Missing("SESSION_SECRET"))?;
        let auth =
            AuthConfig::new(session_secret.as_bytes()).map_err(|_| ConfigError::Invalid("SESSION_SECRET"))?;

        // Stripe configuration
        let stripe_secret_key = std::env::var("STRIPE_SECRET_KEY")
            .map_err(|_| ConfigError::Missing("STRIPE_SECRET_KEY"))?;

        let stripe_webhook_secret = std::env::var("STRIPE_WEBHOOK_SECRET")
            .map_err(|_| ConfigError::Missing("STRIPE_WEBHOOK_SECRET"))?;

        let default_success_url = std::env::var("BILLING_SUCCESS_URL")
            .unwrap_or_else(|_| "https://app.example.com/billing/success".to_string());

        let default_cancel_url = std::env::var("BILLING_CANCEL_URL")
            .unwrap_or_else(|_| "https://app.example.com/billing/cancel".to_string());

        let mut billing = BillingConfig::new(&stripe_secret_key, &stripe_webhook_secret)
            .with_urls(&default_success_url, &default_cancel_url);

        // Checkout price ids are optional; sync works without them
        if let Ok(price) = std::env::var("STRIPE_PRICE_PRO") {
            billing = billing.with_price(PlanType::Pro, price);
        }
        if let Ok(price) = std::env::var("STRIPE_PRICE_PRO_ANNUAL") {
            billing = billing.with_price(PlanType::ProAnnual, price);
        }

        // Plan-mapping amounts, overridable for test-mode prices
        if let (Ok(monthly), Ok(annual)) = (
            std::env::var("PRO_MONTHLY_CENTS"),
            std::env::var("PRO_ANNUAL_CENTS"),
        ) {
            let monthly = monthly
                .parse()
                .map_err(|_| ConfigError::Invalid("PRO_MONTHLY_CENTS"))?;
            let annual = annual
                .parse()
                .map_err(|_| ConfigError::Invalid("PRO_ANNUAL_CENTS"))?;
            billing = billing.with_amounts(monthly, annual);
        }

        let cron_secret =
            std::env::var("CRON_SECRET").map_err(|_| ConfigError::Missing("CRON_SECRET"))?;

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .map_err(|_| ConfigError::Invalid("REQUEST_TIMEOUT_SECS"))?;

        let metrics_enabled = std::env::var("METRICS_ENABLED")
            .unwrap_or_else(|_| "true".to_string())
            .parse()
            .unwrap_or(true);

        Ok(Self {
            http_port,
            database_url,
            auth,
            billing,
            cron_secret,
            request_timeout: Duration::from_secs(request_timeout_secs),
            metrics_enabled,
        })
    }
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}
