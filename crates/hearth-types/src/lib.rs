//! Hearth Types - Shared domain types
//!
//! This crate contains domain types used across Hearth services:
//! - Household, child, and subscription identifiers
//! - Subscription plans and feature gating
//! - Entitlement snapshots

pub mod entitlement;
pub mod feature;
pub mod ids;
pub mod plan;
pub mod subscription;

pub use entitlement::*;
pub use feature::*;
pub use ids::*;
pub use plan::*;
pub use subscription::*;
