//! HMAC-signed sessions
//!
//! Sessions are `base64url(json payload).base64url(hmac)`. The upstream
//! identity layer shares the signing secret and mints parent sessions in the
//! same format; child and nanny sessions are minted here after PIN or token
//! verification. Handlers receive the verified payload as an explicit value,
//! never through ambient global state.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use hearth_types::HouseholdId;

use crate::crypto::HmacKey;
use crate::AuthError;

/// Who a session belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionRole {
    /// Adult household member
    Parent,
    /// Child account (PIN or device login)
    Child,
    /// Caregiver admitted via one-time token
    Nanny,
}

/// Signed session payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionPayload {
    /// Subject (user or child) id
    pub subject_id: Uuid,
    /// Household the session is scoped to
    pub household_id: Uuid,
    /// Session role
    pub role: SessionRole,
    /// Issue timestamp (milliseconds)
    pub issued: i64,
    /// Expiration timestamp (milliseconds)
    pub expires: i64,
}

impl SessionPayload {
    /// Create a payload expiring after `ttl`
    pub fn new(
        subject_id: Uuid,
        household_id: HouseholdId,
        role: SessionRole,
        ttl: std::time::Duration,
    ) -> Self {
        let now = Utc::now().timestamp_millis();
        Self {
            subject_id,
            household_id: household_id.0,
            role,
            issued: now,
            expires: now + ttl.as_millis() as i64,
        }
    }

    /// Check if the session is expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp_millis() > self.expires
    }

    /// Household scope as a domain id
    pub fn household(&self) -> HouseholdId {
        HouseholdId(self.household_id)
    }
}

/// Signs and verifies session strings
#[derive(Clone)]
pub struct SessionSigner {
    key: HmacKey,
}

impl SessionSigner {
    /// Create a signer from a pre-validated key
    pub fn new(key: HmacKey) -> Self {
        Self { key }
    }

    /// Serialize and sign a payload
    pub fn issue(&self, payload: &SessionPayload) -> Result<String, AuthError> {
        let body = serde_json::to_vec(payload).map_err(|e| AuthError::Internal(e.to_string()))?;
        let encoded = URL_SAFE_NO_PAD.encode(&body);
        let mac = self.key.sign(encoded.as_bytes());
        Ok(format!("{}.{}", encoded, URL_SAFE_NO_PAD.encode(mac)))
    }

    /// Verify a session string and return its payload.
    ///
    /// The signature is checked before the payload is parsed; a forged
    /// session never reaches the JSON decoder.
    pub fn verify(&self, session: &str) -> Result<SessionPayload, AuthError> {
        let (encoded, sig) = session.split_once('.').ok_or(AuthError::InvalidSession)?;

        let sig_bytes = URL_SAFE_NO_PAD
            .decode(sig)
            .map_err(|_| AuthError::InvalidSession)?;
        if !self.key.verify(encoded.as_bytes(), &sig_bytes) {
            return Err(AuthError::InvalidSession);
        }

        let body = URL_SAFE_NO_PAD
            .decode(encoded)
            .map_err(|_| AuthError::InvalidSession)?;
        let payload: SessionPayload =
            serde_json::from_slice(&body).map_err(|_| AuthError::InvalidSession)?;

        if payload.is_expired() {
            return Err(AuthError::SessionExpired);
        }

        Ok(payload)
    }
}

impl std::fmt::Debug for SessionSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionSigner").finish_non_exhaustive()
    }
}
