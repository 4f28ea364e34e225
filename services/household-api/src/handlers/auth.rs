//! Authentication handlers (nanny tokens, child PIN and device login)

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use hearth_auth_core::{SessionPayload, SessionRole};
use hearth_types::{ChildIdentity, HouseholdId};

use crate::error::{ApiError, ApiResult};
use crate::extractors::{ParentSession, SESSION_COOKIE};
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct NannyTokenResponse {
    pub token: String,
    pub expires_at: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyTokenRequest {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct VerifyTokenResponse {
    pub household_id: String,
    pub session: String,
    pub expires_at: String,
}

#[derive(Debug, Deserialize)]
pub struct ChildLoginRequest {
    pub household_id: Uuid,
    pub pin: String,
}

#[derive(Debug, Deserialize)]
pub struct DeviceLoginRequest {
    pub device_id: String,
}

#[derive(Debug, Serialize)]
pub struct ChildLoginResponse {
    pub child: ChildInfo,
    pub session: String,
    pub expires_at: String,
}

#[derive(Debug, Serialize)]
pub struct ChildInfo {
    pub id: String,
    pub household_id: String,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl From<ChildIdentity> for ChildInfo {
    fn from(identity: ChildIdentity) -> Self {
        Self {
            id: identity.id.to_string(),
            household_id: identity.household_id.to_string(),
            display_name: identity.display_name,
            avatar_url: identity.avatar_url,
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/v1/auth/nanny-token
///
/// Issue a one-time caregiver code for the caller's household. The raw code
/// appears in this response and nowhere else.
pub async fn create_nanny_token(
    State(state): State<AppState>,
    ParentSession(session): ParentSession,
) -> ApiResult<Json<NannyTokenResponse>> {
    let issued = state.tokens.generate(session.household()).await?;

    metrics::counter!("auth_nanny_tokens_issued_total").increment(1);

    Ok(Json(NannyTokenResponse {
        token: issued.token,
        expires_at: issued.expires_at.to_rfc3339(),
    }))
}

/// POST /api/v1/auth/nanny-token/verify
///
/// Exchange a one-time code for a nanny session. The code is consumed even
/// if the caller discards the session.
pub async fn verify_nanny_token(
    State(state): State<AppState>,
    Json(req): Json<VerifyTokenRequest>,
) -> ApiResult<impl IntoResponse> {
    let household_id = state.tokens.verify(&req.token).await?;

    let payload = SessionPayload::new(
        Uuid::new_v4(),
        household_id,
        SessionRole::Nanny,
        state.config.auth.session_ttl,
    );
    let session = state.signer.issue(&payload)?;

    metrics::counter!("auth_nanny_tokens_verified_total").increment(1);

    let response = VerifyTokenResponse {
        household_id: household_id.to_string(),
        session: session.clone(),
        expires_at: chrono::DateTime::from_timestamp_millis(payload.expires)
            .map(|t| t.to_rfc3339())
            .unwrap_or_default(),
    };

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, session_cookie(&session, &state))],
        Json(response),
    ))
}

/// POST /api/v1/auth/child-login
///
/// Child PIN login, scoped to one household.
pub async fn child_login(
    State(state): State<AppState>,
    Json(req): Json<ChildLoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let identity = state
        .pins
        .verify_pin(HouseholdId(req.household_id), &req.pin)
        .await?;

    metrics::counter!("auth_child_logins_total", "method" => "pin").increment(1);

    child_session_response(&state, identity)
}

/// POST /api/v1/auth/device-login
///
/// PIN-less login for a registered family device. 404 for unknown devices.
pub async fn device_login(
    State(state): State<AppState>,
    Json(req): Json<DeviceLoginRequest>,
) -> ApiResult<impl IntoResponse> {
    if req.device_id.trim().is_empty() {
        return Err(ApiError::BadRequest("device_id is required".to_string()));
    }

    let identity = state.pins.device_login(&req.device_id).await?;

    metrics::counter!("auth_child_logins_total", "method" => "device").increment(1);

    child_session_response(&state, identity)
}

fn child_session_response(
    state: &AppState,
    identity: ChildIdentity,
) -> ApiResult<(StatusCode, [(header::HeaderName, String); 1], Json<ChildLoginResponse>)> {
    let payload = SessionPayload::new(
        identity.id.0,
        identity.household_id,
        SessionRole::Child,
        state.config.auth.session_ttl,
    );
    let session = state.signer.issue(&payload)?;

    let response = ChildLoginResponse {
        child: identity.into(),
        session: session.clone(),
        expires_at: chrono::DateTime::from_timestamp_millis(payload.expires)
            .map(|t| t.to_rfc3339())
            .unwrap_or_default(),
    };

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, session_cookie(&session, state))],
        Json(response),
    ))
}

fn session_cookie(session: &str, state: &AppState) -> String {
    format!(
        "{SESSION_COOKIE}={}; HttpOnly; Secure; SameSite=Strict; Path=/; Max-Age={}",
        session,
        state.config.auth.session_ttl.as_secs()
    )
}
