//! Error types for the household API service.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use hearth_auth_core::AuthError;
use hearth_billing_core::BillingError;

/// API error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

/// API error type
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found")]
    NotFound,

    #[error("Forbidden")]
    Forbidden,

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Billing(#[from] BillingError),

    #[error("Database error")]
    Database(#[from] hearth_db::DbError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::Auth(e) => match e {
                AuthError::InvalidCode
                | AuthError::MissingSession
                | AuthError::InvalidSession
                | AuthError::SessionExpired => StatusCode::UNAUTHORIZED,
                AuthError::DeviceNotRegistered => StatusCode::NOT_FOUND,
                AuthError::InvalidPinFormat => StatusCode::BAD_REQUEST,
                AuthError::Forbidden => StatusCode::FORBIDDEN,
                AuthError::Database(_) | AuthError::Internal(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Billing(e) => match e {
                BillingError::SubscriptionNotFound => StatusCode::NOT_FOUND,
                BillingError::OwnershipMismatch => StatusCode::FORBIDDEN,
                BillingError::AlreadyCanceled => StatusCode::CONFLICT,
                BillingError::InvalidPlan(_) | BillingError::WebhookError(_) => {
                    StatusCode::BAD_REQUEST
                }
                BillingError::ProviderError(_)
                | BillingError::Inconsistent { .. }
                | BillingError::Database(_)
                | BillingError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::NotFound => "NOT_FOUND",
            Self::Forbidden => "FORBIDDEN",
            Self::Auth(e) => match e {
                AuthError::InvalidCode => "INVALID_CODE",
                AuthError::DeviceNotRegistered => "DEVICE_NOT_REGISTERED",
                AuthError::InvalidPinFormat => "INVALID_PIN_FORMAT",
                AuthError::MissingSession => "MISSING_SESSION",
                AuthError::InvalidSession => "INVALID_SESSION",
                AuthError::SessionExpired => "SESSION_EXPIRED",
                AuthError::Forbidden => "FORBIDDEN",
                AuthError::Database(_) | AuthError::Internal(_) => "INTERNAL_ERROR",
            },
            Self::Billing(e) => match e {
                BillingError::SubscriptionNotFound => "SUBSCRIPTION_NOT_FOUND",
                BillingError::OwnershipMismatch => "FORBIDDEN",
                BillingError::AlreadyCanceled => "ALREADY_CANCELED",
                BillingError::InvalidPlan(_) => "INVALID_PLAN",
                BillingError::WebhookError(_) => "WEBHOOK_ERROR",
                BillingError::ProviderError(_) => "PROVIDER_ERROR",
                // Distinct code so operators can alert on it
                BillingError::Inconsistent { .. } => "RECONCILIATION_REQUIRED",
                BillingError::Database(_) | BillingError::Internal(_) => "INTERNAL_ERROR",
            },
            Self::Database(_) | Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// External message. Auth rejections are deliberately generic; the
    /// specific cause is already logged where it was classified.
    fn message(&self) -> String {
        match self {
            Self::Auth(AuthError::InvalidCode) => "Invalid or expired code".to_string(),
            Self::Database(_) | Self::Internal(_) => "Internal error".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = ?self, "Internal API error");
        }

        let body = ErrorResponse {
            error: ErrorDetail {
                code: self.error_code().to_string(),
                message: self.message(),
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
