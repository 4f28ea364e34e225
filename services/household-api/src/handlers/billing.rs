//! Billing handlers (entitlement, checkout, cancel, quota checks)

use std::time::Instant;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use hearth_types::{Entitlement, Feature, HouseholdId, PlanType, ResourceKind};

use crate::error::{ApiError, ApiResult};
use crate::extractors::{ParentSession, Session};
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct EntitlementResponse {
    pub plan: String,
    pub is_trial_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trial_end_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription_end_date: Option<String>,
    pub features: Vec<&'static str>,
    pub limits: LimitsInfo,
}

#[derive(Debug, Serialize)]
pub struct LimitsInfo {
    pub bills_per_month: i64,
    pub events_per_month: i64,
    pub household_members: i64,
}

impl From<Entitlement> for EntitlementResponse {
    fn from(e: Entitlement) -> Self {
        let limits = e.limits();
        Self {
            plan: e.plan.to_string(),
            is_trial_active: e.is_trial_active,
            trial_end_date: e.trial_end_date.map(|t| t.to_rfc3339()),
            subscription_end_date: e.subscription_end_date.map(|t| t.to_rfc3339()),
            features: Feature::ALL
                .iter()
                .filter(|f| e.allows(**f))
                .map(|f| f.name())
                .collect(),
            limits: LimitsInfo {
                bills_per_month: limits.bills_per_month,
                events_per_month: limits.events_per_month,
                household_members: limits.household_members,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub plan: String,
    pub success_url: Option<String>,
    pub cancel_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub session_id: String,
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct CancelRequest {
    pub subscription_id: String,
}

#[derive(Debug, Serialize)]
pub struct CancelResponse {
    pub canceled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refund_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CanCreateRequest {
    pub resource: String,
}

#[derive(Debug, Serialize)]
pub struct CanCreateResponse {
    pub allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub used: Option<i64>,
    pub limit: i64,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/v1/billing/entitlement
///
/// Refresh from the provider, then return the household's entitlement. A
/// provider outage degrades to the stored state rather than failing.
pub async fn get_entitlement(
    State(state): State<AppState>,
    ParentSession(session): ParentSession,
) -> ApiResult<Json<EntitlementResponse>> {
    let start = Instant::now();
    let household_id = session.household();
    let email = owner_email(&state, household_id).await?;

    let entitlement = state
        .billing
        .refresh_entitlement(household_id, &email)
        .await?;
    state.resolver.invalidate(household_id).await;

    metrics::histogram!("billing_operation_duration_seconds", "operation" => "check_status")
        .record(start.elapsed().as_secs_f64());

    Ok(Json(entitlement.into()))
}

/// POST /api/v1/billing/checkout
///
/// Create a hosted checkout session for a paid plan.
pub async fn create_checkout(
    State(state): State<AppState>,
    ParentSession(session): ParentSession,
    Json(req): Json<CheckoutRequest>,
) -> ApiResult<Json<CheckoutResponse>> {
    let plan: PlanType = req
        .plan
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("unknown plan: {}", req.plan)))?;

    let household_id = session.household();
    let email = owner_email(&state, household_id).await?;

    let checkout = state
        .billing
        .create_checkout(
            household_id,
            &email,
            plan,
            req.success_url.as_deref(),
            req.cancel_url.as_deref(),
        )
        .await?;

    metrics::counter!("billing_checkouts_created_total").increment(1);

    Ok(Json(CheckoutResponse {
        session_id: checkout.session_id,
        url: checkout.url,
    }))
}

/// POST /api/v1/billing/cancel
///
/// Cancel the household's subscription and refund the latest paid invoice.
pub async fn cancel_subscription(
    State(state): State<AppState>,
    ParentSession(session): ParentSession,
    Json(req): Json<CancelRequest>,
) -> ApiResult<Json<CancelResponse>> {
    if req.subscription_id.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "subscription_id is required".to_string(),
        ));
    }

    let household_id = session.household();
    let outcome = state
        .billing
        .cancel_and_refund(&req.subscription_id, household_id)
        .await?;
    state.resolver.invalidate(household_id).await;

    metrics::counter!("billing_subscriptions_canceled_total").increment(1);

    Ok(Json(CancelResponse {
        canceled: true,
        refund_id: outcome.refund_id,
    }))
}

/// POST /api/v1/billing/can-create
///
/// Quota check for creating another bill, event, or household member.
pub async fn can_create(
    State(state): State<AppState>,
    Session(session): Session,
    Json(req): Json<CanCreateRequest>,
) -> ApiResult<Json<CanCreateResponse>> {
    let resource: ResourceKind = req
        .resource
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("unknown resource: {}", req.resource)))?;

    let check = state.gate.can_create(resource, session.household()).await?;

    Ok(Json(CanCreateResponse {
        allowed: check.allowed,
        used: check.used,
        limit: check.limit,
    }))
}

/// Resolve the owner email used for provider customer lookups.
async fn owner_email(state: &AppState, household_id: HouseholdId) -> ApiResult<String> {
    use hearth_db::HouseholdRepository;

    state
        .repos
        .households
        .find_by_id(household_id.0)
        .await?
        .map(|h| h.owner_email)
        .ok_or(ApiError::NotFound)
}
