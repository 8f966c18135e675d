//! Operational readiness gate
//!
//! This state machine is operational only: it answers "may the kernel be
//! invoked right now?" and encodes no economic, valuation, or policy
//! meaning. Any non-Ready state results in an explicit refusal value.
//! Enforcing readiness before invoking the engine or a mutation path is
//! the caller's responsibility.

use std::fmt;
use std::sync::Arc;

use bursar_types::Refusal;
use parking_lot::RwLock;

/// Operational readiness states
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadinessState {
    /// The kernel has not been initialized for this host instance
    Uninitialized,
    /// The kernel is constructing its runtime and wiring lifecycle boundaries
    Initializing,
    /// The kernel may accept requests
    Ready,
    /// A reload boundary is in progress; all requests must be refused
    Reloading,
    /// An unrecoverable failure was recorded; all requests must be refused
    Failed(Refusal),
}

impl ReadinessState {
    fn name(&self) -> &'static str {
        match self {
            Self::Uninitialized => "UNINITIALIZED",
            Self::Initializing => "INITIALIZING",
            Self::Ready => "READY",
            Self::Reloading => "RELOADING",
            Self::Failed(_) => "FAILED",
        }
    }
}

impl fmt::Display for ReadinessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl Default for ReadinessState {
    fn default() -> Self {
        Self::Uninitialized
    }
}

/// Explicitly constructed, thread-safe readiness gate.
///
/// Clones share state, so a host constructs one gate and hands copies to
/// every entry point; tests construct isolated instances.
#[derive(Clone, Default)]
pub struct ReadinessGate {
    state: Arc<RwLock<ReadinessState>>,
}

impl ReadinessGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ReadinessState {
        self.state.read().clone()
    }

    pub fn is_ready(&self) -> bool {
        matches!(*self.state.read(), ReadinessState::Ready)
    }

    /// Transition to Initializing. Always legal; clears a prior failure.
    pub fn mark_initializing(&self) {
        *self.state.write() = ReadinessState::Initializing;
        tracing::debug!("readiness gate initializing");
    }

    /// Transition to Ready. Always legal; clears a prior failure.
    pub fn mark_ready(&self) {
        *self.state.write() = ReadinessState::Ready;
        tracing::info!("readiness gate ready");
    }

    /// Enter the reload boundary. Only a Ready gate begins reloading;
    /// returns whether the boundary was entered.
    pub fn begin_reload(&self) -> bool {
        let mut state = self.state.write();
        if matches!(*state, ReadinessState::Ready) {
            *state = ReadinessState::Reloading;
            true
        } else {
            false
        }
    }

    /// Exit the reload boundary. A failure recorded mid-reload keeps the
    /// gate Failed; otherwise the gate returns to Ready.
    pub fn end_reload(&self) {
        let mut state = self.state.write();
        if !matches!(*state, ReadinessState::Failed(_)) {
            *state = ReadinessState::Ready;
        }
    }

    /// Record an unrecoverable failure. Absorbing: only explicit
    /// administrative recovery (`mark_initializing` / `mark_ready`)
    /// leaves this state.
    pub fn mark_failed(&self, refusal: Refusal) {
        tracing::warn!(code = refusal.code(), "readiness gate failed");
        *self.state.write() = ReadinessState::Failed(refusal);
    }

    /// An explicit refusal when the gate is not Ready; `None` when Ready.
    /// Never panics.
    pub fn refuse_if_not_ready(&self) -> Option<Refusal> {
        let state = self.state.read();
        match &*state {
            ReadinessState::Ready => None,
            ReadinessState::Failed(refusal) => Some(refusal.clone()),
            other => Refusal::new(
                "KERNEL_NOT_READY",
                format!("kernel is not ready to accept requests ({other})"),
            )
            .ok(),
        }
    }
}
