//! Bursar Engine - Deterministic exchange evaluation
//!
//! # Binding invariants
//!
//! 1. Evaluation is deterministic and side-effect free.
//! 2. Exactly one `EvaluationOutcome` is returned per invocation.
//! 3. Exactly one `AuditRecord` is emitted per invocation.
//! 4. Evaluation short-circuits on the first denial.
//! 5. No policy layer may mutate state.
//! 6. Valuation produces data only; mutation occurs elsewhere.
//! 7. Pass indicates mutation is possible, not performed.
//! 8. Deny is explicit and final; no stacking occurs.
//! 9. Zero or negative value cannot produce Pass.
//! 10. The engine has no knowledge of adapters, storage, or UI.
//!
//! Violation of any invariant indicates an engine bug.

use std::sync::Arc;

use bursar_audit::AuditSink;
use bursar_policy::{PolicyDecision, PolicyLayer};
use bursar_types::{AuditRecord, DenialReason, EvaluationOutcome, ExchangeRequest};
use bursar_valuation::ValuationService;
use chrono::Utc;

pub mod readiness;

pub use readiness::{ReadinessGate, ReadinessState};

/// Orchestrates the policy chain, valuation, and audit emission
pub struct EvaluationEngine {
    policy_layers: Vec<Arc<dyn PolicyLayer>>,
    valuation: Arc<dyn ValuationService>,
    audit: Arc<dyn AuditSink>,
}

impl EvaluationEngine {
    pub fn new(
        policy_layers: Vec<Arc<dyn PolicyLayer>>,
        valuation: Arc<dyn ValuationService>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            policy_layers,
            valuation,
            audit,
        }
    }

    /// Evaluate an exchange request through all policy layers and valuation.
    ///
    /// Safe to invoke concurrently provided the policy layers and the
    /// valuation service are side-effect free; the audit sink serializes
    /// itself.
    pub fn evaluate(&self, request: &ExchangeRequest) -> EvaluationOutcome {
        for layer in &self.policy_layers {
            if let PolicyDecision::Deny(reason) = layer.evaluate(request) {
                return self.conclude(request, EvaluationOutcome::deny(reason));
            }
        }

        let snapshot = self.valuation.valuate(request);

        if !snapshot.has_any_accepted() {
            return self.conclude(request, EvaluationOutcome::deny(DenialReason::InvalidValue));
        }

        self.conclude(request, EvaluationOutcome::pass(snapshot))
    }

    fn conclude(&self, request: &ExchangeRequest, outcome: EvaluationOutcome) -> EvaluationOutcome {
        let record = AuditRecord::new(Utc::now(), request.clone(), outcome.clone());
        self.audit.emit(&record);
        tracing::debug!(
            allowed = outcome.allowed(),
            reason = outcome.denial_reason().map(|r| r.code()),
            "exchange evaluation concluded"
        );
        outcome
    }
}
