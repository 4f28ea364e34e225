//! Internal cron handlers

use std::time::Instant;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::Serialize;
use subtle::ConstantTimeEq;

use hearth_db::HouseholdRepository;
use hearth_types::HouseholdId;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Header carrying the cron shared secret
const CRON_SECRET_HEADER: &str = "x-cron-secret";

#[derive(Debug, Serialize)]
pub struct PurgeTokensResponse {
    pub purged: u64,
}

#[derive(Debug, Serialize)]
pub struct SyncAllResponse {
    pub synced: usize,
    pub errors: Vec<SyncError>,
}

#[derive(Debug, Serialize)]
pub struct SyncError {
    pub household_id: String,
    pub error: String,
}

/// POST /internal/billing/sync-all
///
/// Fan out a provider sync across every household. Per-household failures
/// are collected and reported; the batch always runs to completion and the
/// route returns 200 even with partial failures.
pub async fn sync_all(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<(StatusCode, Json<SyncAllResponse>)> {
    verify_cron_secret(&state, &headers)?;

    let start = Instant::now();
    let households = state.repos.households.list_all().await?;
    let total = households.len();

    let mut synced = 0;
    let mut errors = Vec::new();

    for household in households {
        let household_id = HouseholdId(household.id);
        match state.billing.sync(household_id, &household.owner_email).await {
            Ok(_) => {
                state.resolver.invalidate(household_id).await;
                synced += 1;
            }
            Err(e) => {
                tracing::warn!(
                    household_id = %household_id,
                    error = %e,
                    "Household sync failed, continuing batch"
                );
                errors.push(SyncError {
                    household_id: household_id.to_string(),
                    error: e.to_string(),
                });
            }
        }
    }

    tracing::info!(
        total,
        synced,
        failed = errors.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Subscription sync batch complete"
    );
    metrics::counter!("billing_sync_batch_households_total", "status" => "ok")
        .increment(synced as u64);
    metrics::counter!("billing_sync_batch_households_total", "status" => "error")
        .increment(errors.len() as u64);

    Ok((StatusCode::OK, Json(SyncAllResponse { synced, errors })))
}

/// POST /internal/auth/purge-tokens
///
/// Delete expired nanny token rows. Expired codes stop verifying on their
/// own; this only keeps the table from accumulating spent rows.
pub async fn purge_tokens(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<PurgeTokensResponse>> {
    verify_cron_secret(&state, &headers)?;

    let purged = state.tokens.purge_expired().await?;

    tracing::info!(purged, "Expired nanny tokens purged");
    metrics::counter!("auth_nanny_tokens_purged_total").increment(purged);

    Ok(Json(PurgeTokensResponse { purged }))
}

/// Constant-time check of the cron shared secret
fn verify_cron_secret(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let provided = headers
        .get(CRON_SECRET_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    let expected = state.config.cron_secret.as_bytes();
    let matches =
        provided.len() == expected.len() && bool::from(provided.as_bytes().ct_eq(expected));

    if !matches {
        tracing::warn!("Cron route called with missing or wrong secret");
        return Err(ApiError::Forbidden);
    }
    Ok(())
}
