//! Single-use mutation steps
//!
//! A step moves through `Pending -> Applied(undo data) -> RolledBack`;
//! the undo data exists only while the step is applied, so re-application
//! and double rollback cannot leak state. Steps are owned exclusively by
//! one transaction attempt.

use std::collections::BTreeSet;
use std::sync::Arc;

use bursar_types::{
    BursarError, CreditPlan, CurrencyId, MutationContext, PrincipalId, ResourceCatalog,
    ResourceId,
};
use thiserror::Error;

use crate::store::{BalanceStore, StoreError};
use crate::surface::{ResourceSurface, Stack};

/// Step failures
#[derive(Debug, Error)]
pub enum StepError {
    #[error("resource id does not resolve: {resource}")]
    UnknownResourceId { resource: ResourceId },

    #[error("owned quantity of {resource} is short by {missing}")]
    InsufficientOwnedItems { resource: ResourceId, missing: u32 },

    #[error("balance {available} is below required {required} ({currency})")]
    InsufficientFunds {
        currency: CurrencyId,
        required: i64,
        available: i64,
    },

    #[error("step was already applied")]
    AlreadyApplied,

    #[error("bound identity does not match the executing principal")]
    PlayerMismatch,

    #[error("surfaces cannot hold {remaining} more of {resource}")]
    SurfaceFull { resource: ResourceId, remaining: u32 },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl StepError {
    /// Stable, machine-checkable code
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownResourceId { .. } => "UNKNOWN_RESOURCE_ID",
            Self::InsufficientOwnedItems { .. } => "INSUFFICIENT_OWNED_ITEMS",
            Self::InsufficientFunds { .. } => "INSUFFICIENT_FUNDS",
            Self::AlreadyApplied => "ALREADY_APPLIED",
            Self::PlayerMismatch => "PLAYER_MISMATCH",
            Self::SurfaceFull { .. } => "INVENTORY_FULL",
            Self::Store(_) => "STORAGE_ERROR",
        }
    }
}

/// Single-use step lifecycle; undo data lives only in `Applied`
#[derive(Debug)]
enum StepState<U> {
    Pending,
    Applied(U),
    RolledBack,
}

impl<U> StepState<U> {
    fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

/// Snapshot of one slot's prior contents
#[derive(Debug, Clone)]
struct SlotSnapshot {
    surface: usize,
    slot: usize,
    original: Option<Stack>,
}

/// Removes planned resources from a principal's surfaces, with rollback.
///
/// Surfaces are drained in their given order; each distinct slot is
/// snapshotted exactly once before it is first mutated. If any planned
/// removal cannot be fully satisfied, every snapshot taken so far is
/// restored in reverse order and the step fails; partial removal is
/// never observable.
pub struct RemovalStep {
    principal: PrincipalId,
    context: MutationContext,
    surfaces: Vec<Arc<dyn ResourceSurface>>,
    catalog: Arc<dyn ResourceCatalog>,
    state: StepState<Vec<SlotSnapshot>>,
}

impl RemovalStep {
    pub fn new(
        principal: PrincipalId,
        context: MutationContext,
        surfaces: Vec<Arc<dyn ResourceSurface>>,
        catalog: Arc<dyn ResourceCatalog>,
    ) -> Self {
        Self {
            principal,
            context,
            surfaces,
            catalog,
            state: StepState::Pending,
        }
    }

    /// The identity the mutation context is bound to
    pub fn bound_identity(&self) -> &PrincipalId {
        self.context.target()
    }

    pub fn apply(&mut self) -> Result<(), StepError> {
        if !self.state.is_pending() {
            return Err(StepError::AlreadyApplied);
        }
        if self.principal != *self.context.target() {
            return Err(StepError::PlayerMismatch);
        }

        let mut snapshots: Vec<SlotSnapshot> = Vec::new();
        let mut snapshotted: BTreeSet<(usize, usize)> = BTreeSet::new();

        for removal in self.context.removals() {
            let resource = removal.resource();
            if !self.catalog.contains(resource) {
                Self::restore(&self.surfaces, &snapshots);
                return Err(StepError::UnknownResourceId {
                    resource: resource.clone(),
                });
            }

            let mut remaining = removal.quantity();
            for (surface_index, surface) in self.surfaces.iter().enumerate() {
                remaining = Self::drain(
                    surface.as_ref(),
                    surface_index,
                    resource,
                    remaining,
                    &mut snapshots,
                    &mut snapshotted,
                );
                if remaining == 0 {
                    break;
                }
            }

            if remaining > 0 {
                Self::restore(&self.surfaces, &snapshots);
                return Err(StepError::InsufficientOwnedItems {
                    resource: resource.clone(),
                    missing: remaining,
                });
            }
        }

        self.state = StepState::Applied(snapshots);
        Ok(())
    }

    /// Restore every snapshotted slot. A rollback with nothing applied is
    /// a no-op.
    pub fn rollback(&mut self) {
        match std::mem::replace(&mut self.state, StepState::RolledBack) {
            StepState::Applied(snapshots) => Self::restore(&self.surfaces, &snapshots),
            StepState::Pending => self.state = StepState::Pending,
            StepState::RolledBack => {}
        }
    }

    fn drain(
        surface: &dyn ResourceSurface,
        surface_index: usize,
        resource: &ResourceId,
        mut remaining: u32,
        snapshots: &mut Vec<SlotSnapshot>,
        snapshotted: &mut BTreeSet<(usize, usize)>,
    ) -> u32 {
        for slot in 0..surface.slot_count() {
            if remaining == 0 {
                break;
            }
            let stack = match surface.stack_at(slot) {
                Some(stack) if stack.resource() == resource => stack,
                _ => continue,
            };

            if snapshotted.insert((surface_index, slot)) {
                snapshots.push(SlotSnapshot {
                    surface: surface_index,
                    slot,
                    original: Some(stack.clone()),
                });
            }

            let take = stack.quantity().min(remaining);
            let left = stack.quantity() - take;
            let replacement = if left == 0 {
                None
            } else {
                Some(Stack::new(resource.clone(), left))
            };
            surface.set_stack_at(slot, replacement);
            remaining -= take;
        }
        remaining
    }

    fn restore(surfaces: &[Arc<dyn ResourceSurface>], snapshots: &[SlotSnapshot]) {
        for snapshot in snapshots.iter().rev() {
            if let Some(surface) = surfaces.get(snapshot.surface) {
                surface.set_stack_at(snapshot.slot, snapshot.original.clone());
            }
        }
    }
}

/// Credits one currency amount to the plan's bound identity, recording
/// the exact delta for rollback.
pub struct CreditStep {
    store: Arc<dyn BalanceStore>,
    target: PrincipalId,
    currency: CurrencyId,
    amount: i64,
    state: StepState<i64>,
}

impl CreditStep {
    /// One step per currency entry of the plan, in plan order
    pub fn for_plan(store: &Arc<dyn BalanceStore>, plan: &CreditPlan) -> Vec<CreditStep> {
        plan.credits_by_currency()
            .iter()
            .map(|(currency, amount)| CreditStep {
                store: Arc::clone(store),
                target: plan.target().clone(),
                currency: currency.clone(),
                amount: *amount,
                state: StepState::Pending,
            })
            .collect()
    }

    /// The identity the credit plan is bound to
    pub fn bound_identity(&self) -> &PrincipalId {
        &self.target
    }

    pub fn currency(&self) -> &CurrencyId {
        &self.currency
    }

    pub fn apply(&mut self, principal: &PrincipalId) -> Result<(), StepError> {
        if !self.state.is_pending() {
            return Err(StepError::AlreadyApplied);
        }
        if *principal != self.target {
            return Err(StepError::PlayerMismatch);
        }
        self.store.apply_delta(principal, &self.currency, self.amount)?;
        self.state = StepState::Applied(self.amount);
        Ok(())
    }

    /// Apply the inverse delta exactly once
    pub fn rollback(&mut self, principal: &PrincipalId) {
        match std::mem::replace(&mut self.state, StepState::RolledBack) {
            StepState::Applied(delta) => {
                if let Err(error) = self.store.apply_delta(principal, &self.currency, -delta) {
                    tracing::warn!(
                        code = error.code(),
                        currency = %self.currency,
                        "credit rollback could not reach the balance store"
                    );
                }
            }
            StepState::Pending => self.state = StepState::Pending,
            StepState::RolledBack => {}
        }
    }
}

/// Debits a positive amount after verifying the balance covers it.
pub struct DebitStep {
    store: Arc<dyn BalanceStore>,
    currency: CurrencyId,
    amount: i64,
    state: StepState<i64>,
}

impl DebitStep {
    /// Create a debit step; the amount must be positive
    pub fn new(
        store: Arc<dyn BalanceStore>,
        amount: i64,
        currency: CurrencyId,
    ) -> bursar_types::Result<Self> {
        if amount <= 0 {
            return Err(BursarError::invalid_input("amount", "must be > 0"));
        }
        Ok(Self {
            store,
            currency,
            amount,
            state: StepState::Pending,
        })
    }

    pub fn apply(&mut self, principal: &PrincipalId) -> Result<(), StepError> {
        if !self.state.is_pending() {
            return Err(StepError::AlreadyApplied);
        }
        let available = self.store.balance(principal, &self.currency)?;
        if available < self.amount {
            return Err(StepError::InsufficientFunds {
                currency: self.currency.clone(),
                required: self.amount,
                available,
            });
        }
        self.store.apply_delta(principal, &self.currency, -self.amount)?;
        self.state = StepState::Applied(self.amount);
        Ok(())
    }

    pub fn rollback(&mut self, principal: &PrincipalId) {
        match std::mem::replace(&mut self.state, StepState::RolledBack) {
            StepState::Applied(amount) => {
                if let Err(error) = self.store.apply_delta(principal, &self.currency, amount) {
                    tracing::warn!(
                        code = error.code(),
                        currency = %self.currency,
                        "debit rollback could not reach the balance store"
                    );
                }
            }
            StepState::Pending => self.state = StepState::Pending,
            StepState::RolledBack => {}
        }
    }
}

/// Places purchased resources onto surfaces, removing exactly what was
/// granted on rollback.
pub struct GrantStep {
    surfaces: Vec<Arc<dyn ResourceSurface>>,
    catalog: Arc<dyn ResourceCatalog>,
    resource: ResourceId,
    quantity: u32,
    state: StepState<u32>,
}

impl GrantStep {
    pub fn new(
        surfaces: Vec<Arc<dyn ResourceSurface>>,
        catalog: Arc<dyn ResourceCatalog>,
        resource: ResourceId,
        quantity: u32,
    ) -> Self {
        Self {
            surfaces,
            catalog,
            resource,
            quantity,
            state: StepState::Pending,
        }
    }

    pub fn apply(&mut self) -> Result<(), StepError> {
        if !self.state.is_pending() {
            return Err(StepError::AlreadyApplied);
        }
        if !self.catalog.contains(&self.resource) {
            return Err(StepError::UnknownResourceId {
                resource: self.resource.clone(),
            });
        }

        let mut remaining = self.quantity;
        for surface in &self.surfaces {
            if remaining == 0 {
                break;
            }
            remaining -= surface.insert(&self.resource, remaining);
        }

        let granted = self.quantity - remaining;
        if remaining > 0 {
            Self::remove(&self.surfaces, &self.resource, granted);
            return Err(StepError::SurfaceFull {
                resource: self.resource.clone(),
                remaining,
            });
        }

        self.state = StepState::Applied(granted);
        Ok(())
    }

    /// Remove exactly the granted quantity
    pub fn rollback(&mut self) {
        match std::mem::replace(&mut self.state, StepState::RolledBack) {
            StepState::Applied(granted) => Self::remove(&self.surfaces, &self.resource, granted),
            StepState::Pending => self.state = StepState::Pending,
            StepState::RolledBack => {}
        }
    }

    fn remove(surfaces: &[Arc<dyn ResourceSurface>], resource: &ResourceId, quantity: u32) {
        let mut remaining = quantity;
        for surface in surfaces.iter().rev() {
            for slot in (0..surface.slot_count()).rev() {
                if remaining == 0 {
                    return;
                }
                let stack = match surface.stack_at(slot) {
                    Some(stack) if stack.resource() == resource => stack,
                    _ => continue,
                };
                let take = stack.quantity().min(remaining);
                let left = stack.quantity() - take;
                let replacement = if left == 0 {
                    None
                } else {
                    Some(Stack::new(resource.clone(), left))
                };
                surface.set_stack_at(slot, replacement);
                remaining -= take;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryBalanceStore;
    use crate::surface::MemorySurface;
    use bursar_types::{PlannedRemoval, StaticCatalog};
    use std::collections::BTreeMap;

    fn ore() -> ResourceId {
        ResourceId::new("metal.ore").unwrap()
    }

    fn stone() -> ResourceId {
        ResourceId::new("stone.block").unwrap()
    }

    fn coins() -> CurrencyId {
        CurrencyId::new("coins").unwrap()
    }

    fn catalog() -> Arc<StaticCatalog> {
        let mut catalog = StaticCatalog::new();
        catalog.insert(ore(), vec![]);
        catalog.insert(stone(), vec![]);
        Arc::new(catalog)
    }

    fn context(target: &PrincipalId, resource: ResourceId, quantity: u32) -> MutationContext {
        MutationContext::new(
            target.clone(),
            vec![PlannedRemoval::new(resource, quantity).unwrap()],
        )
        .unwrap()
    }

    #[test]
    fn test_removal_drains_across_surfaces_in_order() {
        let target = PrincipalId::new();
        let first = Arc::new(MemorySurface::with_stacks(vec![Some(Stack::new(ore(), 2))]));
        let second = Arc::new(MemorySurface::with_stacks(vec![Some(Stack::new(ore(), 5))]));

        let mut step = RemovalStep::new(
            target.clone(),
            context(&target, ore(), 4),
            vec![first.clone(), second.clone()],
            catalog(),
        );

        step.apply().unwrap();
        assert_eq!(first.total_of(&ore()), 0);
        assert_eq!(second.total_of(&ore()), 3);
    }

    #[test]
    fn test_removal_shortfall_restores_everything() {
        let target = PrincipalId::new();
        let surface = Arc::new(MemorySurface::with_stacks(vec![
            Some(Stack::new(ore(), 2)),
            Some(Stack::new(stone(), 9)),
            Some(Stack::new(ore(), 1)),
        ]));
        let before = surface.snapshot();

        let mut step = RemovalStep::new(
            target.clone(),
            context(&target, ore(), 5),
            vec![surface.clone()],
            catalog(),
        );

        let error = step.apply().unwrap_err();
        assert_eq!(error.code(), "INSUFFICIENT_OWNED_ITEMS");
        assert!(matches!(
            error,
            StepError::InsufficientOwnedItems { missing: 2, .. }
        ));
        assert_eq!(surface.snapshot(), before);
    }

    #[test]
    fn test_removal_unknown_resource_fails_clean() {
        let target = PrincipalId::new();
        let surface = Arc::new(MemorySurface::with_stacks(vec![Some(Stack::new(ore(), 2))]));
        let before = surface.snapshot();

        let unknown = ResourceId::new("void.dust").unwrap();
        let mut step = RemovalStep::new(
            target.clone(),
            context(&target, unknown, 1),
            vec![surface.clone()],
            catalog(),
        );

        assert_eq!(step.apply().unwrap_err().code(), "UNKNOWN_RESOURCE_ID");
        assert_eq!(surface.snapshot(), before);
    }

    #[test]
    fn test_removal_rollback_restores_exact_slots() {
        let target = PrincipalId::new();
        let surface = Arc::new(MemorySurface::with_stacks(vec![
            Some(Stack::new(ore(), 4)),
            None,
            Some(Stack::new(ore(), 4)),
        ]));
        let before = surface.snapshot();

        let mut step = RemovalStep::new(
            target.clone(),
            context(&target, ore(), 6),
            vec![surface.clone()],
            catalog(),
        );
        step.apply().unwrap();
        assert_eq!(surface.total_of(&ore()), 2);

        step.rollback();
        assert_eq!(surface.snapshot(), before);
    }

    #[test]
    fn test_removal_rollback_without_apply_is_noop() {
        let target = PrincipalId::new();
        let surface = Arc::new(MemorySurface::with_stacks(vec![Some(Stack::new(ore(), 2))]));
        let before = surface.snapshot();

        let mut step = RemovalStep::new(
            target.clone(),
            context(&target, ore(), 1),
            vec![surface.clone()],
            catalog(),
        );
        step.rollback();
        assert_eq!(surface.snapshot(), before);

        // Still pending, so apply succeeds afterwards.
        step.apply().unwrap();
        assert_eq!(surface.total_of(&ore()), 1);
    }

    #[test]
    fn test_removal_mismatched_identity_refuses() {
        let target = PrincipalId::new();
        let surface = Arc::new(MemorySurface::with_stacks(vec![Some(Stack::new(ore(), 2))]));

        let mut step = RemovalStep::new(
            PrincipalId::new(),
            context(&target, ore(), 1),
            vec![surface.clone()],
            catalog(),
        );
        assert_eq!(step.apply().unwrap_err().code(), "PLAYER_MISMATCH");
        assert_eq!(surface.total_of(&ore()), 2);
    }

    #[test]
    fn test_credit_step_applies_and_rolls_back_exact_delta() {
        let store: Arc<dyn BalanceStore> = Arc::new(MemoryBalanceStore::new());
        let target = PrincipalId::new();

        let mut credits = BTreeMap::new();
        credits.insert(coins(), 25);
        let plan = CreditPlan::new(target.clone(), credits).unwrap();

        let mut steps = CreditStep::for_plan(&store, &plan);
        assert_eq!(steps.len(), 1);

        steps[0].apply(&target).unwrap();
        assert_eq!(store.balance(&target, &coins()).unwrap(), 25);

        steps[0].rollback(&target);
        assert_eq!(store.balance(&target, &coins()).unwrap(), 0);
    }

    #[test]
    fn test_credit_step_is_single_use() {
        let store: Arc<dyn BalanceStore> = Arc::new(MemoryBalanceStore::new());
        let target = PrincipalId::new();

        let mut credits = BTreeMap::new();
        credits.insert(coins(), 10);
        let plan = CreditPlan::new(target.clone(), credits).unwrap();
        let mut steps = CreditStep::for_plan(&store, &plan);

        steps[0].apply(&target).unwrap();
        assert_eq!(steps[0].apply(&target).unwrap_err().code(), "ALREADY_APPLIED");
        assert_eq!(store.balance(&target, &coins()).unwrap(), 10);
    }

    #[test]
    fn test_credit_step_refuses_wrong_principal() {
        let store: Arc<dyn BalanceStore> = Arc::new(MemoryBalanceStore::new());
        let target = PrincipalId::new();

        let mut credits = BTreeMap::new();
        credits.insert(coins(), 10);
        let plan = CreditPlan::new(target.clone(), credits).unwrap();
        let mut steps = CreditStep::for_plan(&store, &plan);

        let other = PrincipalId::new();
        assert_eq!(steps[0].apply(&other).unwrap_err().code(), "PLAYER_MISMATCH");
        assert_eq!(store.balance(&target, &coins()).unwrap(), 0);
    }

    #[test]
    fn test_debit_step_requires_funds() {
        let store: Arc<dyn BalanceStore> = Arc::new(MemoryBalanceStore::new());
        let principal = PrincipalId::new();
        store.apply_delta(&principal, &coins(), 5).unwrap();

        let mut step = DebitStep::new(store.clone(), 8, coins()).unwrap();
        let error = step.apply(&principal).unwrap_err();
        assert_eq!(error.code(), "INSUFFICIENT_FUNDS");
        assert_eq!(store.balance(&principal, &coins()).unwrap(), 5);
    }

    #[test]
    fn test_debit_step_round_trip() {
        let store: Arc<dyn BalanceStore> = Arc::new(MemoryBalanceStore::new());
        let principal = PrincipalId::new();
        store.apply_delta(&principal, &coins(), 20).unwrap();

        let mut step = DebitStep::new(store.clone(), 8, coins()).unwrap();
        step.apply(&principal).unwrap();
        assert_eq!(store.balance(&principal, &coins()).unwrap(), 12);

        step.rollback(&principal);
        assert_eq!(store.balance(&principal, &coins()).unwrap(), 20);
    }

    #[test]
    fn test_grant_step_places_and_rolls_back() {
        let surface = Arc::new(MemorySurface::new(2));
        let mut step = GrantStep::new(vec![surface.clone()], catalog(), ore(), 6);

        step.apply().unwrap();
        assert_eq!(surface.total_of(&ore()), 6);

        step.rollback();
        assert_eq!(surface.total_of(&ore()), 0);
    }

    #[test]
    fn test_grant_step_full_surfaces_fail_clean() {
        let surface = Arc::new(MemorySurface::with_stacks(vec![Some(Stack::new(stone(), 1))]));
        let mut step = GrantStep::new(vec![surface.clone()], catalog(), ore(), 3);

        let error = step.apply().unwrap_err();
        assert_eq!(error.code(), "INVENTORY_FULL");
        assert_eq!(surface.total_of(&ore()), 0);
    }
}
