//! Atomic mutation transactions
//!
//! A transaction coordinates one removal step and one or more credit
//! steps for a single principal: all effects become observable or none
//! do. Binding checks run before any side effect, and each instance is
//! single-use.
//!
//! The remove-before-credit ordering keeps the rollback path total: a
//! removal failure touches nothing else, and a credit failure unwinds
//! the already-applied credits in reverse order before restoring the
//! removal.

use std::sync::Arc;

use bursar_types::{EvaluationOutcome, PrincipalId, PurchasePlan, ResourceCatalog};
use thiserror::Error;

use crate::step::{CreditStep, DebitStep, GrantStep, RemovalStep, StepError};
use crate::store::BalanceStore;
use crate::surface::ResourceSurface;

/// Transaction refusals and failures
#[derive(Debug, Error)]
pub enum TransactionError {
    #[error("Exchange evaluation was denied; nothing was mutated.")]
    CoreDenied,

    #[error("The mutation context is bound to a different principal.")]
    MutationContextPlayerMismatch,

    #[error("The credit plan is bound to a different principal.")]
    CreditPlanPlayerMismatch,

    #[error("The purchase plan is bound to a different principal.")]
    PurchasePlanPlayerMismatch,

    #[error("Resource removal failed: {0}")]
    InventoryRemovalFailed(#[source] StepError),

    #[error("Balance credit failed: {0}")]
    BalanceCreditFailed(#[source] StepError),

    #[error("Balance debit failed: {0}")]
    BalanceDebitFailed(#[source] StepError),

    #[error("Resource grant failed: {0}")]
    InventoryGrantFailed(#[source] StepError),

    #[error("This transaction was already executed.")]
    AlreadyExecuted,
}

impl TransactionError {
    /// Stable, machine-checkable code
    pub fn code(&self) -> &'static str {
        match self {
            Self::CoreDenied => "CORE_DENIED",
            Self::MutationContextPlayerMismatch => "MUTATION_CONTEXT_PLAYER_MISMATCH",
            Self::CreditPlanPlayerMismatch => "CREDIT_PLAN_PLAYER_MISMATCH",
            Self::PurchasePlanPlayerMismatch => "PURCHASE_PLAN_PLAYER_MISMATCH",
            Self::InventoryRemovalFailed(_) => "INVENTORY_REMOVAL_FAILED",
            Self::BalanceCreditFailed(_) => "BALANCE_CREDIT_FAILED",
            Self::BalanceDebitFailed(_) => "BALANCE_DEBIT_FAILED",
            Self::InventoryGrantFailed(_) => "INVENTORY_GRANT_FAILED",
            Self::AlreadyExecuted => "TRANSACTION_ALREADY_EXECUTED",
        }
    }

    /// Full reason string, `CODE` or `CODE: CAUSE`
    pub fn reason(&self) -> String {
        match self {
            Self::InventoryRemovalFailed(cause)
            | Self::BalanceCreditFailed(cause)
            | Self::BalanceDebitFailed(cause)
            | Self::InventoryGrantFailed(cause) => format!("{}: {}", self.code(), cause.code()),
            other => other.code().to_string(),
        }
    }
}

/// Atomic removal-then-credit for one principal.
///
/// The removal step, every credit step, and the executing principal must
/// all be bound to the same identity; any mismatch refuses before a
/// single `apply` runs. One credit step per currency in the plan, in
/// plan order.
pub struct MutationTransaction {
    principal: PrincipalId,
    removal: RemovalStep,
    credits: Vec<CreditStep>,
    executed: bool,
}

impl MutationTransaction {
    pub fn new(principal: PrincipalId, removal: RemovalStep, credits: Vec<CreditStep>) -> Self {
        Self {
            principal,
            removal,
            credits,
            executed: false,
        }
    }

    /// Execute atomically. Single-use: a second call refuses without
    /// touching state.
    pub fn execute(&mut self, outcome: &EvaluationOutcome) -> Result<(), TransactionError> {
        if self.executed {
            return Err(TransactionError::AlreadyExecuted);
        }
        self.executed = true;

        if !outcome.allowed() {
            return Err(TransactionError::CoreDenied);
        }
        if *self.removal.bound_identity() != self.principal {
            return Err(TransactionError::MutationContextPlayerMismatch);
        }
        if self
            .credits
            .iter()
            .any(|credit| *credit.bound_identity() != self.principal)
        {
            return Err(TransactionError::CreditPlanPlayerMismatch);
        }

        if let Err(cause) = self.removal.apply() {
            return Err(TransactionError::InventoryRemovalFailed(cause));
        }

        for index in 0..self.credits.len() {
            if let Err(cause) = self.credits[index].apply(&self.principal) {
                for applied in self.credits[..index].iter_mut().rev() {
                    applied.rollback(&self.principal);
                }
                self.removal.rollback();
                tracing::warn!(
                    principal = %self.principal,
                    code = cause.code(),
                    "mutation transaction rolled back"
                );
                return Err(TransactionError::BalanceCreditFailed(cause));
            }
        }

        tracing::info!(
            principal = %self.principal,
            currencies = self.credits.len(),
            "mutation transaction committed"
        );
        Ok(())
    }
}

/// Atomic debit-then-grant for one purchase plan.
pub struct PurchaseTransaction {
    principal: PrincipalId,
    plan: PurchasePlan,
    debit: DebitStep,
    grant: GrantStep,
    executed: bool,
}

impl PurchaseTransaction {
    /// Build both steps from the frozen plan
    pub fn new(
        principal: PrincipalId,
        plan: PurchasePlan,
        store: Arc<dyn BalanceStore>,
        surfaces: Vec<Arc<dyn ResourceSurface>>,
        catalog: Arc<dyn ResourceCatalog>,
    ) -> bursar_types::Result<Self> {
        let debit = DebitStep::new(store, plan.cost(), plan.currency().clone())?;
        let grant = GrantStep::new(surfaces, catalog, plan.resource().clone(), plan.quantity());
        Ok(Self {
            principal,
            plan,
            debit,
            grant,
            executed: false,
        })
    }

    /// Execute atomically. Single-use: a second call refuses without
    /// touching state.
    pub fn execute(&mut self, outcome: &EvaluationOutcome) -> Result<(), TransactionError> {
        if self.executed {
            return Err(TransactionError::AlreadyExecuted);
        }
        self.executed = true;

        if !outcome.allowed() {
            return Err(TransactionError::CoreDenied);
        }
        if *self.plan.target() != self.principal {
            return Err(TransactionError::PurchasePlanPlayerMismatch);
        }

        if let Err(cause) = self.debit.apply(&self.principal) {
            return Err(TransactionError::BalanceDebitFailed(cause));
        }

        if let Err(cause) = self.grant.apply() {
            self.debit.rollback(&self.principal);
            tracing::warn!(
                principal = %self.principal,
                code = cause.code(),
                "purchase transaction rolled back"
            );
            return Err(TransactionError::InventoryGrantFailed(cause));
        }

        tracing::info!(
            principal = %self.principal,
            shop = %self.plan.shop(),
            resource = %self.plan.resource(),
            quantity = self.plan.quantity(),
            cost = self.plan.cost(),
            "purchase transaction committed"
        );
        Ok(())
    }
}
