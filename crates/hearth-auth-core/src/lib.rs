//! Hearth Auth Core - Authentication business logic
//!
//! Core authentication functionality: one-time nanny access tokens, child
//! PIN login, HMAC-signed sessions, and entitlement/quota checks.

pub mod config;
pub mod crypto;
pub mod entitlement;
pub mod error;
pub mod pin;
pub mod session;
pub mod token;

pub use config::AuthConfig;
pub use entitlement::{EntitlementResolver, QuotaCheck, UsageGate};
pub use error::AuthError;
pub use pin::ChildPinService;
pub use session::{SessionPayload, SessionRole, SessionSigner};
pub use token::{IssuedToken, NannyTokenService};
