//! Frozen mutation-side plans
//!
//! A credit plan is a post-evaluation intent to increase a principal's
//! balance; a mutation context is an adapter-verified intent to remove
//! specific owned resources. Both are frozen once constructed and are
//! consumed exactly once by a transaction attempt.

use crate::{BursarError, CurrencyId, PrincipalId, ResourceId, Result, ShopId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Immutable credit intent derived from planned, accepted value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditPlan {
    target: PrincipalId,
    credits_by_currency: BTreeMap<CurrencyId, i64>,
}

impl CreditPlan {
    /// Freeze a credit plan; every entry must be positive and at least one
    /// entry is required
    pub fn new(target: PrincipalId, credits_by_currency: BTreeMap<CurrencyId, i64>) -> Result<Self> {
        if credits_by_currency.is_empty() {
            return Err(BursarError::invalid_input(
                "credits_by_currency",
                "must be non-empty",
            ));
        }
        for amount in credits_by_currency.values() {
            if *amount <= 0 {
                return Err(BursarError::invalid_input(
                    "credits_by_currency",
                    "credit amount must be > 0",
                ));
            }
        }
        Ok(Self {
            target,
            credits_by_currency,
        })
    }

    pub fn target(&self) -> &PrincipalId {
        &self.target
    }

    pub fn credits_by_currency(&self) -> &BTreeMap<CurrencyId, i64> {
        &self.credits_by_currency
    }
}

/// A single, explicit resource removal plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedRemoval {
    resource: ResourceId,
    quantity: u32,
}

impl PlannedRemoval {
    pub fn new(resource: ResourceId, quantity: u32) -> Result<Self> {
        if quantity == 0 {
            return Err(BursarError::invalid_input("quantity", "must be > 0"));
        }
        Ok(Self { resource, quantity })
    }

    pub fn resource(&self) -> &ResourceId {
        &self.resource
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }
}

/// Immutable, adapter-verified execution plan for resource removals
///
/// Built only from independently verified ownership truth, never derived
/// from the evaluation engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationContext {
    target: PrincipalId,
    removals: Vec<PlannedRemoval>,
}

impl MutationContext {
    pub fn new(target: PrincipalId, removals: Vec<PlannedRemoval>) -> Result<Self> {
        if removals.is_empty() {
            return Err(BursarError::invalid_input("removals", "must not be empty"));
        }
        Ok(Self { target, removals })
    }

    pub fn target(&self) -> &PrincipalId {
        &self.target
    }

    pub fn removals(&self) -> &[PlannedRemoval] {
        &self.removals
    }
}

/// Immutable purchase intent: debit the cost, grant the goods
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchasePlan {
    target: PrincipalId,
    shop: ShopId,
    resource: ResourceId,
    quantity: u32,
    cost: i64,
    currency: CurrencyId,
}

impl PurchasePlan {
    pub fn new(
        target: PrincipalId,
        shop: ShopId,
        resource: ResourceId,
        quantity: u32,
        cost: i64,
        currency: CurrencyId,
    ) -> Result<Self> {
        if quantity == 0 {
            return Err(BursarError::invalid_input("quantity", "must be > 0"));
        }
        if cost <= 0 {
            return Err(BursarError::invalid_input("cost", "must be > 0"));
        }
        Ok(Self {
            target,
            shop,
            resource,
            quantity,
            cost,
            currency,
        })
    }

    pub fn target(&self) -> &PrincipalId {
        &self.target
    }

    pub fn shop(&self) -> &ShopId {
        &self.shop
    }

    pub fn resource(&self) -> &ResourceId {
        &self.resource
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn cost(&self) -> i64 {
        self.cost
    }

    pub fn currency(&self) -> &CurrencyId {
        &self.currency
    }
}
