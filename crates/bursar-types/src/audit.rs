//! Audit records
//!
//! Exactly one record exists per evaluation call; the record is created
//! and handed to the sink before the outcome is returned.

use crate::{EvaluationOutcome, ExchangeRequest};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Immutable audit record of one evaluation decision
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    timestamp: DateTime<Utc>,
    request: ExchangeRequest,
    outcome: EvaluationOutcome,
}

impl AuditRecord {
    pub fn new(
        timestamp: DateTime<Utc>,
        request: ExchangeRequest,
        outcome: EvaluationOutcome,
    ) -> Self {
        Self {
            timestamp,
            request,
            outcome,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn request(&self) -> &ExchangeRequest {
        &self.request
    }

    pub fn outcome(&self) -> &EvaluationOutcome {
        &self.outcome
    }
}
