//! Credit and purchase planning
//!
//! Planners deterministically map an evaluation outcome to a frozen plan
//! or an explicit refusal. They never recompute valuation and never
//! guess; refusal is a first-class value, not an exception.

use bursar_types::{
    CreditPlan, EvaluationOutcome, PrincipalId, PurchasePlan, ResourceId, ShopId,
};
use thiserror::Error;

/// Why planning could not proceed.
///
/// Snapshot-shape refusals have no constructor here: a Pass always
/// carries the concrete valuation snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanRefusal {
    #[error("Exchange evaluation did not pass; no credit can be planned.")]
    EvaluationDenied,

    #[error("No accepted items were eligible for credit.")]
    NoAcceptedItems,

    #[error("Total accepted value was zero; no credit can be planned.")]
    ZeroCreditValue,
}

impl PlanRefusal {
    /// Stable, machine-checkable code
    pub fn code(&self) -> &'static str {
        match self {
            Self::EvaluationDenied => "EVALUATION_DENIED",
            Self::NoAcceptedItems => "NO_ACCEPTED_ITEMS",
            Self::ZeroCreditValue => "ZERO_CREDIT_VALUE",
        }
    }
}

/// Plans balance credits from a positive evaluation.
///
/// Checks run in order and the first failure wins; success freezes a plan
/// bound to the target identity with every currency entry verified
/// positive.
#[derive(Debug, Clone, Copy, Default)]
pub struct CreditPlanner;

impl CreditPlanner {
    pub fn new() -> Self {
        Self
    }

    pub fn plan(
        &self,
        target: &PrincipalId,
        outcome: &EvaluationOutcome,
    ) -> Result<CreditPlan, PlanRefusal> {
        let snapshot = match outcome {
            EvaluationOutcome::Pass { snapshot } => snapshot,
            EvaluationOutcome::Deny { .. } => return Err(PlanRefusal::EvaluationDenied),
        };

        if !snapshot.has_any_accepted() {
            return Err(PlanRefusal::NoAcceptedItems);
        }

        CreditPlan::new(target.clone(), snapshot.totals_by_currency().clone())
            .map_err(|_| PlanRefusal::ZeroCreditValue)
    }
}

/// Plans a shop purchase from a positive evaluation.
///
/// The cost is the snapshot's accepted total; the plan freezes the shop,
/// resource, quantity, cost, and currency together.
#[derive(Debug, Clone, Copy, Default)]
pub struct PurchasePlanner;

impl PurchasePlanner {
    pub fn new() -> Self {
        Self
    }

    pub fn plan(
        &self,
        target: &PrincipalId,
        shop: &ShopId,
        resource: &ResourceId,
        quantity: u32,
        outcome: &EvaluationOutcome,
    ) -> Result<PurchasePlan, PlanRefusal> {
        let snapshot = match outcome {
            EvaluationOutcome::Pass { snapshot } => snapshot,
            EvaluationOutcome::Deny { .. } => return Err(PlanRefusal::EvaluationDenied),
        };

        if !snapshot.has_any_accepted() {
            return Err(PlanRefusal::NoAcceptedItems);
        }

        let (currency, cost) = match snapshot.totals_by_currency().iter().next() {
            Some((currency, cost)) => (currency.clone(), *cost),
            None => return Err(PlanRefusal::NoAcceptedItems),
        };

        PurchasePlan::new(
            target.clone(),
            shop.clone(),
            resource.clone(),
            quantity,
            cost,
            currency,
        )
        .map_err(|_| PlanRefusal::ZeroCreditValue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bursar_types::{
        CurrencyId, DenialReason, ValuationItemResult, ValuationSnapshot,
    };

    fn ore() -> ResourceId {
        ResourceId::new("metal.ore").unwrap()
    }

    fn coins() -> CurrencyId {
        CurrencyId::new("coins").unwrap()
    }

    fn pass_with(value: i64) -> EvaluationOutcome {
        EvaluationOutcome::pass(ValuationSnapshot::new(vec![ValuationItemResult::accepted(
            ore(),
            1,
            value,
            coins(),
        )
        .unwrap()]))
    }

    #[test]
    fn test_denied_evaluation_refuses() {
        let outcome = EvaluationOutcome::deny(DenialReason::NoPermission);
        let refusal = CreditPlanner::new()
            .plan(&PrincipalId::new(), &outcome)
            .unwrap_err();
        assert_eq!(refusal.code(), "EVALUATION_DENIED");
    }

    #[test]
    fn test_pass_without_accepted_items_refuses() {
        let snapshot = ValuationSnapshot::new(vec![ValuationItemResult::rejected(
            ore(),
            1,
            DenialReason::InvalidValue,
        )]);
        let outcome = EvaluationOutcome::pass(snapshot);

        let refusal = CreditPlanner::new()
            .plan(&PrincipalId::new(), &outcome)
            .unwrap_err();
        assert_eq!(refusal.code(), "NO_ACCEPTED_ITEMS");
    }

    #[test]
    fn test_pass_with_value_plans_all_currencies() {
        let gems = CurrencyId::new("gems").unwrap();
        let snapshot = ValuationSnapshot::new(vec![
            ValuationItemResult::accepted(ore(), 2, 10, coins()).unwrap(),
            ValuationItemResult::accepted(ore(), 1, 4, gems.clone()).unwrap(),
        ]);
        let target = PrincipalId::new();

        let plan = CreditPlanner::new()
            .plan(&target, &EvaluationOutcome::pass(snapshot))
            .unwrap();

        assert_eq!(plan.target(), &target);
        assert_eq!(plan.credits_by_currency().get(&coins()), Some(&10));
        assert_eq!(plan.credits_by_currency().get(&gems), Some(&4));
    }

    #[test]
    fn test_purchase_plan_carries_cost_and_currency() {
        let target = PrincipalId::new();
        let shop = ShopId::new("general").unwrap();

        let plan = PurchasePlanner::new()
            .plan(&target, &shop, &ore(), 3, &pass_with(36))
            .unwrap();

        assert_eq!(plan.cost(), 36);
        assert_eq!(plan.currency(), &coins());
        assert_eq!(plan.quantity(), 3);
    }

    #[test]
    fn test_purchase_plan_refuses_denied_evaluation() {
        let refusal = PurchasePlanner::new()
            .plan(
                &PrincipalId::new(),
                &ShopId::new("general").unwrap(),
                &ore(),
                1,
                &EvaluationOutcome::deny(DenialReason::InvalidValue),
            )
            .unwrap_err();
        assert_eq!(refusal.code(), "EVALUATION_DENIED");
    }
}
