//! Axum extractors for session authentication

use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use hearth_auth_core::{AuthError, SessionPayload, SessionRole};

use crate::state::AppState;

/// Session cookie name
pub const SESSION_COOKIE: &str = "hearth_session";

/// Any verified session, regardless of role
#[derive(Debug, Clone)]
pub struct Session(pub SessionPayload);

/// Verified session restricted to the parent role
#[derive(Debug, Clone)]
pub struct ParentSession(pub SessionPayload);

/// Error response for auth failures
#[derive(Debug, Serialize)]
struct AuthErrorResponse {
    error: AuthErrorDetail,
}

#[derive(Debug, Serialize)]
struct AuthErrorDetail {
    code: &'static str,
    message: &'static str,
}

/// Auth rejection type
pub struct AuthRejection {
    status: StatusCode,
    code: &'static str,
    message: &'static str,
}

impl AuthRejection {
    fn from_auth_error(e: &AuthError) -> Self {
        let (code, message) = match e {
            AuthError::SessionExpired => ("SESSION_EXPIRED", "Session expired"),
            AuthError::MissingSession => ("MISSING_SESSION", "No session provided"),
            _ => ("INVALID_SESSION", "Invalid session"),
        };
        Self {
            status: StatusCode::UNAUTHORIZED,
            code,
            message,
        }
    }
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let body = AuthErrorResponse {
            error: AuthErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

impl<S> FromRequestParts<S> for Session
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let token = extract_session_string(parts)?;

        let payload = app_state.signer.verify(&token).map_err(|e| {
            tracing::debug!(error = %e, "Session verification failed");
            AuthRejection::from_auth_error(&e)
        })?;

        Ok(Session(payload))
    }
}

impl<S> FromRequestParts<S> for ParentSession
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Session(payload) = Session::from_request_parts(parts, state).await?;

        if payload.role != SessionRole::Parent {
            return Err(AuthRejection {
                status: StatusCode::FORBIDDEN,
                code: "FORBIDDEN",
                message: "Parent role required",
            });
        }

        Ok(ParentSession(payload))
    }
}

/// Extract the session string from the Authorization header or cookie
fn extract_session_string(parts: &Parts) -> Result<String, AuthRejection> {
    if let Some(auth_header) = parts.headers.get(header::AUTHORIZATION) {
        let auth_str = auth_header.to_str().map_err(|_| AuthRejection {
            status: StatusCode::BAD_REQUEST,
            code: "INVALID_HEADER",
            message: "Invalid Authorization header encoding",
        })?;

        if let Some(token) = auth_str.strip_prefix("Bearer ") {
            return Ok(token.to_string());
        }
    }

    if let Some(cookie_header) = parts.headers.get(header::COOKIE) {
        let cookie_str = cookie_header.to_str().map_err(|_| AuthRejection {
            status: StatusCode::BAD_REQUEST,
            code: "INVALID_HEADER",
            message: "Invalid Cookie header encoding",
        })?;

        for cookie in cookie_str.split(';') {
            let cookie = cookie.trim();
            if let Some(value) = cookie
                .strip_prefix(SESSION_COOKIE)
                .and_then(|rest| rest.strip_prefix('='))
            {
                return Ok(value.to_string());
            }
        }
    }

    Err(AuthRejection {
        status: StatusCode::UNAUTHORIZED,
        code: "MISSING_SESSION",
        message: "No session provided",
    })
}
