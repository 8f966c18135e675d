//! Valuation results and snapshots
//!
//! Each declared item independently resolves to accepted value or an
//! explicit rejection; the snapshot aggregates accepted totals per
//! currency. Only strictly positive sums appear in the totals, so a
//! snapshot with value to grant is exactly a snapshot with non-empty
//! totals.

use crate::{BursarError, CurrencyId, DenialReason, ResourceId, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Outcome of valuating a single item line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemOutcome {
    /// The line is worth a positive total in the named currency
    Accepted {
        total_value: i64,
        currency: CurrencyId,
    },
    /// The line carries no honest value
    Rejected { reason: DenialReason },
}

/// Result of valuating a single item (or item unit group)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValuationItemResult {
    resource: ResourceId,
    quantity: u32,
    outcome: ItemOutcome,
}

impl ValuationItemResult {
    /// Record an accepted line; total value must be positive
    pub fn accepted(
        resource: ResourceId,
        quantity: u32,
        total_value: i64,
        currency: CurrencyId,
    ) -> Result<Self> {
        if total_value <= 0 {
            return Err(BursarError::invalid_input("total_value", "must be > 0"));
        }
        Ok(Self {
            resource,
            quantity,
            outcome: ItemOutcome::Accepted {
                total_value,
                currency,
            },
        })
    }

    /// Record a rejected line
    pub fn rejected(resource: ResourceId, quantity: u32, reason: DenialReason) -> Self {
        Self {
            resource,
            quantity,
            outcome: ItemOutcome::Rejected { reason },
        }
    }

    pub fn resource(&self) -> &ResourceId {
        &self.resource
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn outcome(&self) -> &ItemOutcome {
        &self.outcome
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self.outcome, ItemOutcome::Accepted { .. })
    }

    /// The rejection reason, when the line was rejected
    pub fn denial_reason(&self) -> Option<DenialReason> {
        match &self.outcome {
            ItemOutcome::Rejected { reason } => Some(*reason),
            ItemOutcome::Accepted { .. } => None,
        }
    }
}

/// Immutable snapshot of a valuation attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValuationSnapshot {
    item_results: Vec<ValuationItemResult>,
    totals_by_currency: BTreeMap<CurrencyId, i64>,
}

impl ValuationSnapshot {
    /// Build a snapshot, deriving per-currency totals from accepted lines.
    /// Only currencies with a strictly positive sum are present.
    pub fn new(item_results: Vec<ValuationItemResult>) -> Self {
        let mut totals: BTreeMap<CurrencyId, i64> = BTreeMap::new();
        for result in &item_results {
            if let ItemOutcome::Accepted {
                total_value,
                currency,
            } = &result.outcome
            {
                let slot = totals.entry(currency.clone()).or_insert(0);
                *slot = slot.saturating_add(*total_value);
            }
        }
        totals.retain(|_, sum| *sum > 0);
        Self {
            item_results,
            totals_by_currency: totals,
        }
    }

    /// A snapshot with no item results
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn item_results(&self) -> &[ValuationItemResult] {
        &self.item_results
    }

    /// Accepted totals per currency, in deterministic order
    pub fn totals_by_currency(&self) -> &BTreeMap<CurrencyId, i64> {
        &self.totals_by_currency
    }

    /// Sum of accepted totals across all currencies
    pub fn total_accepted_value(&self) -> i64 {
        self.totals_by_currency
            .values()
            .fold(0i64, |acc, v| acc.saturating_add(*v))
    }

    /// Whether any declared line was accepted with positive value
    pub fn has_any_accepted(&self) -> bool {
        !self.totals_by_currency.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ore() -> ResourceId {
        ResourceId::new("metal.ore").unwrap()
    }

    fn coins() -> CurrencyId {
        CurrencyId::new("coins").unwrap()
    }

    #[test]
    fn test_accepted_requires_positive_value() {
        assert!(ValuationItemResult::accepted(ore(), 1, 10, coins()).is_ok());
        assert!(ValuationItemResult::accepted(ore(), 1, 0, coins()).is_err());
        assert!(ValuationItemResult::accepted(ore(), 1, -4, coins()).is_err());
    }

    #[test]
    fn test_snapshot_aggregates_per_currency() {
        let gems = CurrencyId::new("gems").unwrap();
        let snapshot = ValuationSnapshot::new(vec![
            ValuationItemResult::accepted(ore(), 2, 10, coins()).unwrap(),
            ValuationItemResult::accepted(ore(), 1, 5, coins()).unwrap(),
            ValuationItemResult::accepted(ore(), 1, 3, gems.clone()).unwrap(),
            ValuationItemResult::rejected(ore(), 1, DenialReason::InvalidValue),
        ]);

        assert!(snapshot.has_any_accepted());
        assert_eq!(snapshot.totals_by_currency().get(&coins()), Some(&15));
        assert_eq!(snapshot.totals_by_currency().get(&gems), Some(&3));
        assert_eq!(snapshot.total_accepted_value(), 18);
        assert_eq!(snapshot.item_results().len(), 4);
    }

    #[test]
    fn test_all_rejected_snapshot_has_no_accepted() {
        let snapshot = ValuationSnapshot::new(vec![
            ValuationItemResult::rejected(ore(), 3, DenialReason::InvalidValue),
            ValuationItemResult::rejected(ore(), 1, DenialReason::InvalidContext),
        ]);
        assert!(!snapshot.has_any_accepted());
        assert!(snapshot.totals_by_currency().is_empty());
        assert_eq!(snapshot.total_accepted_value(), 0);
    }

    #[test]
    fn test_empty_snapshot() {
        assert!(!ValuationSnapshot::empty().has_any_accepted());
    }

    #[test]
    fn test_non_positive_sums_are_excluded() {
        // Accepted outcomes are constructed positive, but the aggregation
        // contract is independent: zero-valued entries never surface.
        let results = vec![ValuationItemResult {
            resource: ore(),
            quantity: 1,
            outcome: ItemOutcome::Accepted {
                total_value: 0,
                currency: coins(),
            },
        }];
        let snapshot = ValuationSnapshot::new(results);
        assert!(!snapshot.has_any_accepted());
    }
}
