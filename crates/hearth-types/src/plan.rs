//! Subscription plan types

use serde::{Deserialize, Serialize};

/// Subscription plan levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanType {
    /// Free plan - the implicit default when no subscription row exists
    Free,
    /// Pro plan - monthly billing
    Pro,
    /// Pro plan - annual billing
    ProAnnual,
}

impl PlanType {
    /// Whether this plan is a paid tier
    pub const fn is_paid(&self) -> bool {
        matches!(self, Self::Pro | Self::ProAnnual)
    }
}

impl std::fmt::Display for PlanType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Free => write!(f, "free"),
            Self::Pro => write!(f, "pro"),
            Self::ProAnnual => write!(f, "pro_annual"),
        }
    }
}

impl std::str::FromStr for PlanType {
    type Err = PlanParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "free" => Ok(Self::Free),
            "pro" => Ok(Self::Pro),
            "pro_annual" | "pro-annual" => Ok(Self::ProAnnual),
            _ => Err(PlanParseError(s.to_string())),
        }
    }
}

/// Error parsing a plan string
#[derive(Debug, Clone)]
pub struct PlanParseError(pub String);

impl std::fmt::Display for PlanParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid plan: {}", self.0)
    }
}

impl std::error::Error for PlanParseError {}
