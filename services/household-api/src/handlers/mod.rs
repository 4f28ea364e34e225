//! HTTP request handlers

mod auth;
mod billing;
mod health;
mod sync;
mod webhook;

pub use auth::{child_login, create_nanny_token, device_login, verify_nanny_token};
pub use billing::{can_create, cancel_subscription, create_checkout, get_entitlement};
pub use health::{health, ready};
pub use sync::{purge_tokens, sync_all};
pub use webhook::stripe_webhook;
