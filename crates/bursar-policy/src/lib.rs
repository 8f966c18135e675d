//! Bursar Policy - Pure eligibility gates over exchange requests
//!
//! A policy layer may only deny explicitly or allow and get out of the way.
//! Layers must not mutate state, infer downstream behavior, or depend on
//! the hosting platform.

use bursar_types::{DenialReason, ExchangeRequest};

pub mod layers;

pub use layers::*;

/// Result of a single policy layer evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyDecision {
    /// The request is eligible as far as this layer is concerned
    Allow,
    /// The request is denied for the given reason
    Deny(DenialReason),
}

impl PolicyDecision {
    pub fn allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }

    pub fn denial_reason(&self) -> Option<DenialReason> {
        match self {
            Self::Deny(reason) => Some(*reason),
            Self::Allow => None,
        }
    }
}

/// A single policy layer in the evaluation pipeline
///
/// Implementations must be pure and read-only; the engine invokes layers
/// in fixed order and short-circuits on the first denial.
pub trait PolicyLayer: Send + Sync {
    fn evaluate(&self, request: &ExchangeRequest) -> PolicyDecision;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decision_accessors() {
        assert!(PolicyDecision::Allow.allowed());
        assert_eq!(PolicyDecision::Allow.denial_reason(), None);

        let deny = PolicyDecision::Deny(DenialReason::NoPermission);
        assert!(!deny.allowed());
        assert_eq!(deny.denial_reason(), Some(DenialReason::NoPermission));
    }
}
