//! Evaluation outcomes
//!
//! A Pass indicates an honest mutation is possible, not performed.
//! A Deny is explicit and final; no stacking occurs.

use crate::{DenialReason, ValuationSnapshot};
use serde::{Deserialize, Serialize};

/// Final result of an exchange evaluation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EvaluationOutcome {
    /// Mutation is possible; carries the concrete valuation snapshot
    Pass { snapshot: ValuationSnapshot },
    /// No honest mutation is possible
    Deny { reason: DenialReason },
}

impl EvaluationOutcome {
    pub fn pass(snapshot: ValuationSnapshot) -> Self {
        Self::Pass { snapshot }
    }

    pub fn deny(reason: DenialReason) -> Self {
        Self::Deny { reason }
    }

    pub fn allowed(&self) -> bool {
        matches!(self, Self::Pass { .. })
    }

    pub fn denial_reason(&self) -> Option<DenialReason> {
        match self {
            Self::Deny { reason } => Some(*reason),
            Self::Pass { .. } => None,
        }
    }

    /// The valuation snapshot, when the evaluation passed
    pub fn snapshot(&self) -> Option<&ValuationSnapshot> {
        match self {
            Self::Pass { snapshot } => Some(snapshot),
            Self::Deny { .. } => None,
        }
    }
}
