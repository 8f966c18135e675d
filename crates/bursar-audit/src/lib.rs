//! Bursar Audit - Destinations for decision records
//!
//! The kernel does not know where audits go; sinks decide persistence,
//! logging, or forwarding. A sink may have side effects but must never
//! propagate failures back into kernel control flow, and it serializes
//! its own internal state.

use std::collections::VecDeque;

use bursar_types::AuditRecord;
use parking_lot::Mutex;

/// Sink for audit records emitted by the evaluation engine
pub trait AuditSink: Send + Sync {
    fn emit(&self, record: &AuditRecord);
}

/// Render a record as a single diagnostic line
pub fn format_record(record: &AuditRecord) -> String {
    let outcome = record.outcome();
    let reason = outcome
        .denial_reason()
        .map(|r| r.code())
        .unwrap_or("-");
    format!(
        "{} allowed={} reason={} intent={:?} target={}",
        record.timestamp().to_rfc3339(),
        outcome.allowed(),
        reason,
        record.request().intent(),
        record.request().target(),
    )
}

/// Bounded in-memory sink keeping the most recent records for diagnostics
pub struct MemoryAuditSink {
    max_records: usize,
    recent: Mutex<VecDeque<String>>,
}

impl MemoryAuditSink {
    const DEFAULT_MAX_RECORDS: usize = 50;

    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_MAX_RECORDS)
    }

    /// Create a sink keeping at most `max_records` lines; zero is clamped
    /// to one so the sink always retains the latest decision
    pub fn with_capacity(max_records: usize) -> Self {
        Self {
            max_records: max_records.max(1),
            recent: Mutex::new(VecDeque::new()),
        }
    }

    /// Append an operator-facing diagnostic line outside the record flow
    pub fn emit_admin(&self, code: &str, message: &str) {
        self.append(format!("{code} {message}"));
    }

    /// The most recent lines, newest first
    pub fn recent(&self, limit: usize) -> Vec<String> {
        let recent = self.recent.lock();
        recent.iter().rev().take(limit).cloned().collect()
    }

    fn append(&self, line: String) {
        let mut recent = self.recent.lock();
        if recent.len() >= self.max_records {
            recent.pop_front();
        }
        recent.push_back(line);
    }
}

impl Default for MemoryAuditSink {
    fn default() -> Self {
        Self::new()
    }
}

impl AuditSink for MemoryAuditSink {
    fn emit(&self, record: &AuditRecord) {
        self.append(format_record(record));
    }
}

/// Sink emitting each record as a structured tracing event
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn emit(&self, record: &AuditRecord) {
        let outcome = record.outcome();
        tracing::info!(
            allowed = outcome.allowed(),
            reason = outcome.denial_reason().map(|r| r.code()),
            intent = ?record.request().intent(),
            target = %record.request().target(),
            "exchange evaluated"
        );
    }
}
