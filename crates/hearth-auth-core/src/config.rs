//! Auth configuration

use std::time::Duration;

use crate::crypto::{HmacKey, HmacKeyError};

/// Auth service configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Key used to sign and verify session payloads
    pub session_key: HmacKey,
    /// Nanny token lifetime
    pub token_ttl: Duration,
    /// Nanny token length in characters
    pub token_length: usize,
    /// Session lifetime
    pub session_ttl: Duration,
}

impl AuthConfig {
    /// Default nanny token lifetime: one hour
    pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(60 * 60);

    /// Default token length. 12 alphanumeric characters gives a space of
    /// 62^12, far beyond what can be guessed inside the expiry window.
    pub const DEFAULT_TOKEN_LENGTH: usize = 12;

    /// Default session lifetime: 12 hours
    pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(12 * 60 * 60);

    /// Create a config with default lifetimes
    pub fn new(session_secret: impl AsRef<[u8]>) -> Result<Self, HmacKeyError> {
        Ok(Self {
            session_key: HmacKey::new(session_secret)?,
            token_ttl: Self::DEFAULT_TOKEN_TTL,
            token_length: Self::DEFAULT_TOKEN_LENGTH,
            session_ttl: Self::DEFAULT_SESSION_TTL,
        })
    }

    /// Override the nanny token lifetime
    pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = ttl;
        self
    }

    /// Override the session lifetime
    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }
}
