//! Denial reason taxonomy
//!
//! Canonical reasons the evaluation pipeline may deny an exchange.
//! This enum is closed; meanings must never change.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical denial reasons for policy and valuation decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DenialReason {
    /// The request's context or declared facts are not legitimate
    InvalidContext,
    /// The actor is not permitted to make this exchange
    NoPermission,
    /// The declared items carry no positive value
    InvalidValue,
    /// The declared resources are not sufficiently owned
    InsufficientResources,
    /// A kernel contract was violated; indicates a bug, not user error
    InternalInconsistency,
}

impl DenialReason {
    /// Stable, machine-checkable code for this reason
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidContext => "INVALID_CONTEXT",
            Self::NoPermission => "NO_PERMISSION",
            Self::InvalidValue => "INVALID_VALUE",
            Self::InsufficientResources => "INSUFFICIENT_RESOURCES",
            Self::InternalInconsistency => "INTERNAL_INCONSISTENCY",
        }
    }
}

impl fmt::Display for DenialReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
