//! Billing configuration

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use hearth_types::PlanType;

/// Billing interval of a provider price
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingInterval {
    /// Monthly billing
    Month,
    /// Annual billing
    Year,
}

impl BillingInterval {
    /// Parse a provider interval string
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "month" => Some(Self::Month),
            "year" => Some(Self::Year),
            _ => None,
        }
    }
}

/// Billing service configuration
#[derive(Debug, Clone)]
pub struct BillingConfig {
    /// Stripe secret key
    pub stripe_secret_key: String,
    /// Stripe webhook secret
    pub stripe_webhook_secret: String,
    /// Map of plans to Stripe price IDs (checkout)
    pub price_ids: HashMap<PlanType, String>,
    /// Pro monthly price in cents (sync plan mapping)
    pub pro_monthly_cents: i64,
    /// Pro annual price in cents (sync plan mapping)
    pub pro_annual_cents: i64,
    /// Default success URL for checkout
    pub default_success_url: String,
    /// Default cancel URL for checkout
    pub default_cancel_url: String,
}

impl BillingConfig {
    /// Create a new billing config with the observed production amounts
    /// ($7.99/month, $79.99/year).
    pub fn new(
        stripe_secret_key: impl Into<String>,
        stripe_webhook_secret: impl Into<String>,
    ) -> Self {
        Self {
            stripe_secret_key: stripe_secret_key.into(),
            stripe_webhook_secret: stripe_webhook_secret.into(),
            price_ids: HashMap::new(),
            pro_monthly_cents: 799,
            pro_annual_cents: 7999,
            default_success_url: "https://app.example.com/billing/success".to_string(),
            default_cancel_url: "https://app.example.com/billing/cancel".to_string(),
        }
    }

    /// Set the checkout price ID for a plan
    pub fn with_price(mut self, plan: PlanType, price_id: impl Into<String>) -> Self {
        self.price_ids.insert(plan, price_id.into());
        self
    }

    /// Override the amounts used for plan mapping
    pub fn with_amounts(mut self, pro_monthly_cents: i64, pro_annual_cents: i64) -> Self {
        self.pro_monthly_cents = pro_monthly_cents;
        self.pro_annual_cents = pro_annual_cents;
        self
    }

    /// Set default redirect URLs
    pub fn with_urls(
        mut self,
        success_url: impl Into<String>,
        cancel_url: impl Into<String>,
    ) -> Self {
        self.default_success_url = success_url.into();
        self.default_cancel_url = cancel_url.into();
        self
    }

    /// Get the checkout price ID for a plan
    pub fn price_id(&self, plan: PlanType) -> Option<&str> {
        self.price_ids.get(&plan).map(String::as_str)
    }

    /// Map a provider price to a plan.
    ///
    /// Matching is by exact amount and interval, not by a stored price id:
    /// changing the price amount on the Stripe side silently breaks this
    /// mapping until the configured amounts are updated to match.
    pub fn plan_for_price(&self, amount_cents: i64, interval: BillingInterval) -> Option<PlanType> {
        match interval {
            BillingInterval::Month if amount_cents == self.pro_monthly_cents => Some(PlanType::Pro),
            BillingInterval::Year if amount_cents == self.pro_annual_cents => {
                Some(PlanType::ProAnnual)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> BillingConfig {
        BillingConfig::new("sk_test", "whsec_test")
    }

    #[test]
    fn test_monthly_amount_maps_to_pro() {
        assert_eq!(
            config().plan_for_price(799, BillingInterval::Month),
            Some(PlanType::Pro)
        );
    }

    #[test]
    fn test_annual_amount_maps_to_pro_annual() {
        assert_eq!(
            config().plan_for_price(7999, BillingInterval::Year),
            Some(PlanType::ProAnnual)
        );
    }

    #[test]
    fn test_unknown_amount_maps_to_nothing() {
        let config = config();
        assert_eq!(config.plan_for_price(999, BillingInterval::Month), None);
        // Right amount on the wrong interval is not a match either
        assert_eq!(config.plan_for_price(799, BillingInterval::Year), None);
    }

    #[test]
    fn test_amount_override() {
        let config = config().with_amounts(499, 4999);
        assert_eq!(
            config.plan_for_price(499, BillingInterval::Month),
            Some(PlanType::Pro)
        );
        assert_eq!(config.plan_for_price(799, BillingInterval::Month), None);
    }

    #[test]
    fn test_interval_parse() {
        assert_eq!(BillingInterval::parse("month"), Some(BillingInterval::Month));
        assert_eq!(BillingInterval::parse("year"), Some(BillingInterval::Year));
        assert_eq!(BillingInterval::parse("week"), None);
    }
}
