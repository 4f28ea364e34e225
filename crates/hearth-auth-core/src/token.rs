//! One-time nanny access tokens
//!
//! A household owner generates a short-lived code and hands it to a
//! caregiver out of band. The code verifies at most once: consumption is a
//! single conditional update at the storage layer, so two concurrent
//! verification attempts cannot both succeed.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::distr::Alphanumeric;
use rand::Rng;
use uuid::Uuid;

use hearth_db::{CreateNannyToken, NannyTokenRepository};
use hearth_types::HouseholdId;

use crate::crypto::hash_secret;
use crate::AuthError;

/// A freshly generated token. The raw code exists only in this value; the
/// store keeps its hash.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// The raw code, returned to the caller exactly once
    pub token: String,
    /// When the code stops verifying
    pub expires_at: DateTime<Utc>,
}

/// Nanny token issue/verify service
#[derive(Clone)]
pub struct NannyTokenService<R: NannyTokenRepository> {
    repo: Arc<R>,
    ttl: Duration,
    length: usize,
}

impl<R: NannyTokenRepository> NannyTokenService<R> {
    /// Create a new token service
    pub fn new(repo: Arc<R>, ttl: Duration, length: usize) -> Self {
        Self { repo, ttl, length }
    }

    /// Generate a one-time code for a household.
    pub async fn generate(&self, household_id: HouseholdId) -> Result<IssuedToken, AuthError> {
        let token: String = rand::rng()
            .sample_iter(&Alphanumeric)
            .take(self.length)
            .map(char::from)
            .collect();

        let expires_at = Utc::now()
            + chrono::Duration::from_std(self.ttl)
                .map_err(|e| AuthError::Internal(e.to_string()))?;

        self.repo
            .create(CreateNannyToken {
                id: Uuid::new_v4(),
                household_id: household_id.0,
                token_hash: hash_secret(&token),
                expires_at,
            })
            .await?;

        tracing::info!(household_id = %household_id, "Nanny token issued");

        Ok(IssuedToken { token, expires_at })
    }

    /// Verify and consume a code, returning the bound household.
    ///
    /// Every failure surfaces as [`AuthError::InvalidCode`]; whether the code
    /// was absent, expired, or already used is logged internally only, so an
    /// attacker probing codes learns nothing from the response.
    pub async fn verify(&self, token: &str) -> Result<HouseholdId, AuthError> {
        let token_hash = hash_secret(token);
        let now = Utc::now();

        if let Some(row) = self.repo.consume(&token_hash, now).await? {
            tracing::info!(household_id = %row.household_id, "Nanny token verified");
            return Ok(HouseholdId(row.household_id));
        }

        // Classify the cause for operator diagnosis after the conditional
        // update already failed; the caller still sees one generic error.
        match self.repo.find_by_hash(&token_hash).await? {
            Some(row) if row.used => {
                tracing::warn!(household_id = %row.household_id, "Nanny token already used");
            }
            Some(row) if row.expires_at <= now => {
                tracing::debug!(household_id = %row.household_id, "Nanny token expired");
            }
            Some(_) => {
                // Lost the consume race to a concurrent caller
                tracing::warn!("Nanny token consumed concurrently");
            }
            None => {
                tracing::debug!("Nanny token not found");
            }
        }

        Err(AuthError::InvalidCode)
    }

    /// Remove expired tokens (maintenance)
    pub async fn purge_expired(&self) -> Result<u64, AuthError> {
        Ok(self.repo.delete_expired(Utc::now()).await?)
    }
}

impl<R: NannyTokenRepository> std::fmt::Debug for NannyTokenService<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NannyTokenService")
            .field("ttl", &self.ttl)
            .field("length", &self.length)
            .finish_non_exhaustive()
    }
}
