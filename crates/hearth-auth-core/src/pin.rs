//! Child PIN login
//!
//! PINs are short numeric codes scoped to a household: the same PIN may
//! exist in two different households and must resolve to two different
//! children. PINs are stored hashed and the raw value is never logged.

use std::sync::Arc;

use hearth_db::ChildRepository;
use hearth_types::{ChildId, ChildIdentity, HouseholdId};

use crate::crypto::hash_secret;
use crate::AuthError;

/// Child PIN login service
#[derive(Clone)]
pub struct ChildPinService<R: ChildRepository> {
    repo: Arc<R>,
}

impl<R: ChildRepository> ChildPinService<R> {
    /// Create a new PIN service
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Verify a PIN within one household.
    ///
    /// The household id is part of the lookup key; a correct PIN presented
    /// against the wrong household fails with the same generic error as a
    /// wrong PIN.
    pub async fn verify_pin(
        &self,
        household_id: HouseholdId,
        pin: &str,
    ) -> Result<ChildIdentity, AuthError> {
        if validate_pin(pin).is_err() {
            // Malformed input cannot match any stored hash; reject without
            // a lookup but with the same external error.
            tracing::debug!(household_id = %household_id, "PIN login with malformed PIN");
            return Err(AuthError::InvalidCode);
        }

        let pin_hash = hash_secret(pin);
        match self
            .repo
            .find_by_pin_hash(household_id.0, &pin_hash)
            .await?
        {
            Some(child) => {
                tracing::info!(
                    household_id = %household_id,
                    child_id = %child.id,
                    "Child PIN login"
                );
                Ok(child.identity())
            }
            None => {
                tracing::debug!(household_id = %household_id, "PIN did not match any child");
                Err(AuthError::InvalidCode)
            }
        }
    }

    /// Log in a registered family device without a PIN.
    pub async fn device_login(&self, device_id: &str) -> Result<ChildIdentity, AuthError> {
        match self.repo.find_by_device_id(device_id).await? {
            Some(child) => {
                tracing::info!(child_id = %child.id, "Child device login");
                Ok(child.identity())
            }
            None => Err(AuthError::DeviceNotRegistered),
        }
    }

    /// Set or replace a child's PIN (parent-role operation).
    pub async fn set_pin(&self, child_id: ChildId, pin: &str) -> Result<(), AuthError> {
        validate_pin(pin)?;
        self.repo
            .update_pin_hash(child_id.0, &hash_secret(pin))
            .await?;
        tracing::info!(child_id = %child_id, "Child PIN updated");
        Ok(())
    }
}

impl<R: ChildRepository> std::fmt::Debug for ChildPinService<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChildPinService").finish()
    }
}

/// PIN format policy: 4 to 6 ASCII digits.
pub fn validate_pin(pin: &str) -> Result<(), AuthError> {
    let len = pin.len();
    if !(4..=6).contains(&len) || !pin.chars().all(|c| c.is_ascii_digit()) {
        return Err(AuthError::InvalidPinFormat);
    }
    Ok(())
}
