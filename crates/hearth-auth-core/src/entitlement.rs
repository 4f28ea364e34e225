//! Entitlement resolution and usage gating

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Datelike, TimeZone, Utc};
use moka::future::Cache;
use uuid::Uuid;

use hearth_db::{SubscriptionRepository, UsageRepository};
use hearth_types::{Entitlement, PlanType, ResourceKind, HouseholdId, UNLIMITED};

use crate::AuthError;

/// Stored subscription fields worth caching.
///
/// Only durable fields are cached; the trial flag is derived from
/// `trial_end_date` on every [`EntitlementResolver::resolve`] call so it can
/// flip the moment the window closes, cache or no cache.
#[derive(Debug, Clone, Copy)]
struct PlanSnapshot {
    plan: PlanType,
    trial_end_date: Option<DateTime<Utc>>,
    subscription_end_date: Option<DateTime<Utc>>,
}

/// Entitlement resolver with a short-lived cache over stored rows
#[derive(Clone)]
pub struct EntitlementResolver<R: SubscriptionRepository> {
    repo: Arc<R>,
    cache: Cache<Uuid, PlanSnapshot>,
}

impl<R: SubscriptionRepository> EntitlementResolver<R> {
    /// Create a new resolver with the default 60 second cache
    pub fn new(repo: Arc<R>) -> Self {
        Self::with_cache_duration(repo, Duration::from_secs(60))
    }

    /// Create a resolver with a custom cache duration
    pub fn with_cache_duration(repo: Arc<R>, cache_duration: Duration) -> Self {
        Self {
            repo,
            cache: Cache::builder()
                .time_to_live(cache_duration)
                .max_capacity(10_000)
                .build(),
        }
    }

    /// Resolve the household's current entitlement.
    ///
    /// Pure read: no writes happen here. A household with no subscription
    /// row resolves to the free default.
    pub async fn resolve(&self, household_id: HouseholdId) -> Result<Entitlement, AuthError> {
        let snapshot = self.snapshot(household_id).await?;
        Ok(match snapshot {
            Some(s) => Entitlement::from_stored(
                s.plan,
                s.trial_end_date,
                s.subscription_end_date,
                Utc::now(),
            ),
            None => Entitlement::free_default(),
        })
    }

    /// Create a free-plan subscription row if the household has none.
    ///
    /// Idempotent: keyed by household, safe to call on every signup retry.
    pub async fn ensure_default_subscription(
        &self,
        household_id: HouseholdId,
    ) -> Result<(), AuthError> {
        self.repo.ensure_default(household_id.0).await?;
        self.cache.invalidate(&household_id.0).await;
        Ok(())
    }

    /// Drop the cached snapshot for a household (after a sync or cancel)
    pub async fn invalidate(&self, household_id: HouseholdId) {
        self.cache.invalidate(&household_id.0).await;
    }

    async fn snapshot(&self, household_id: HouseholdId) -> Result<Option<PlanSnapshot>, AuthError> {
        if let Some(snapshot) = self.cache.get(&household_id.0).await {
            return Ok(Some(snapshot));
        }

        let Some(row) = self.repo.find_by_household(household_id.0).await? else {
            return Ok(None);
        };

        // An unparseable stored plan is treated as free rather than an
        // error; the row stays intact for an operator to inspect.
        let plan: PlanType = row.plan.parse().unwrap_or(PlanType::Free);
        let snapshot = PlanSnapshot {
            plan,
            trial_end_date: row.trial_end_date,
            subscription_end_date: if row.is_active {
                row.subscription_end_date
            } else {
                None
            },
        };

        self.cache.insert(household_id.0, snapshot).await;
        Ok(Some(snapshot))
    }
}

impl<R: SubscriptionRepository> std::fmt::Debug for EntitlementResolver<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntitlementResolver").finish()
    }
}

/// Outcome of a quota check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaCheck {
    /// Whether the creation may proceed
    pub allowed: bool,
    /// Current-period count, when it could be determined
    pub used: Option<i64>,
    /// The applicable limit ([`UNLIMITED`] means no cap)
    pub limit: i64,
}

/// Usage-based quota gate.
///
/// Compares current-period counts against the resolved plan limits. Counting
/// failures fail open: a broken counter must not lock users out of creating
/// bills, so the error is logged and the action permitted.
#[derive(Clone)]
pub struct UsageGate<R: SubscriptionRepository, U: UsageRepository> {
    resolver: EntitlementResolver<R>,
    usage: Arc<U>,
}

impl<R: SubscriptionRepository, U: UsageRepository> UsageGate<R, U> {
    /// Create a new gate sharing the given resolver
    pub fn new(resolver: EntitlementResolver<R>, usage: Arc<U>) -> Self {
        Self { resolver, usage }
    }

    /// Check whether the household may create another resource of this kind.
    pub async fn can_create(
        &self,
        resource: ResourceKind,
        household_id: HouseholdId,
    ) -> Result<QuotaCheck, AuthError> {
        let entitlement = self.resolver.resolve(household_id).await?;
        let limit = entitlement.limits().limit_for(resource);

        if limit == UNLIMITED {
            return Ok(QuotaCheck {
                allowed: true,
                used: None,
                limit,
            });
        }

        let since = month_start_utc(Utc::now());
        let count = match resource {
            ResourceKind::Bill => self.usage.count_bills_since(household_id.0, since).await,
            ResourceKind::Event => self.usage.count_events_since(household_id.0, since).await,
            ResourceKind::Member => self.usage.count_members(household_id.0).await,
        };

        match count {
            Ok(used) => Ok(QuotaCheck {
                allowed: used < limit,
                used: Some(used),
                limit,
            }),
            Err(e) => {
                // Fail open: quota enforcement yields to availability when
                // the counter itself is broken.
                tracing::warn!(
                    error = %e,
                    household_id = %household_id,
                    resource = %resource,
                    "Usage count failed, permitting action"
                );
                Ok(QuotaCheck {
                    allowed: true,
                    used: None,
                    limit,
                })
            }
        }
    }
}

impl<R: SubscriptionRepository, U: UsageRepository> std::fmt::Debug for UsageGate<R, U> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UsageGate").finish()
    }
}

/// Start of the current calendar month in UTC.
///
/// The usage period boundary is pinned to UTC; the owner's locale is not
/// stored server-side.
pub fn month_start_utc(now: DateTime<Utc>) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
        .single()
        .expect("first of month is always a valid UTC timestamp")
}
