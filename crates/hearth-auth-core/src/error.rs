//! Auth errors

use thiserror::Error;

/// Authentication and entitlement errors
#[derive(Error, Debug)]
pub enum AuthError {
    /// Code or PIN rejected. One variant covers absent, expired, and
    /// already-used credentials so callers cannot enumerate which it was;
    /// the specific cause is logged internally.
    #[error("invalid code or PIN")]
    InvalidCode,

    /// Device has no registered child
    #[error("device not registered")]
    DeviceNotRegistered,

    /// PIN does not meet the format policy
    #[error("PIN must be 4-6 digits")]
    InvalidPinFormat,

    /// No session was presented
    #[error("missing session")]
    MissingSession,

    /// Session signature or payload rejected
    #[error("invalid session")]
    InvalidSession,

    /// Session past its expiry
    #[error("session expired")]
    SessionExpired,

    /// Caller's role does not permit the operation
    #[error("forbidden")]
    Forbidden,

    /// Database error
    #[error("database error: {0}")]
    Database(#[from] hearth_db::DbError),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}
