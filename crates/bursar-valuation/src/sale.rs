//! Table-driven sale valuation

use crate::{Blacklist, ValuationService, ValuationTable};
use bursar_types::{
    DenialReason, ExchangePayload, ExchangeRequest, MetadataStance, ResourceCatalog,
    ValuationItemResult, ValuationSnapshot,
};
use std::sync::Arc;

/// Values declared sales against the configured rule table.
///
/// Explicit values only, deny by default: unlisted items, blacklisted
/// items, and items whose declared metadata is relevant are rejected.
pub struct TableValuationService {
    table: ValuationTable,
    blacklist: Blacklist,
    catalog: Arc<dyn ResourceCatalog>,
}

impl TableValuationService {
    pub fn new(
        table: ValuationTable,
        blacklist: Blacklist,
        catalog: Arc<dyn ResourceCatalog>,
    ) -> Self {
        Self {
            table,
            blacklist,
            catalog,
        }
    }
}

impl ValuationService for TableValuationService {
    fn valuate(&self, request: &ExchangeRequest) -> ValuationSnapshot {
        let items = match request.payload() {
            ExchangePayload::DeclaredSale { items } => items,
            ExchangePayload::ShopPurchase { .. } => return ValuationSnapshot::empty(),
        };

        let mut results = Vec::with_capacity(items.len());
        for item in items {
            let resource = item.resource().clone();
            let quantity = item.quantity();
            let tags = self.catalog.tags(&resource);

            if self.blacklist.is_denied(&resource, &tags) {
                results.push(ValuationItemResult::rejected(
                    resource,
                    quantity,
                    DenialReason::InvalidContext,
                ));
                continue;
            }

            if item.metadata() == MetadataStance::Relevant {
                results.push(ValuationItemResult::rejected(
                    resource,
                    quantity,
                    DenialReason::InvalidContext,
                ));
                continue;
            }

            let rule = match self.table.resolve(&resource, &tags) {
                Some(rule) => rule,
                None => {
                    results.push(ValuationItemResult::rejected(
                        resource,
                        quantity,
                        DenialReason::InvalidValue,
                    ));
                    continue;
                }
            };

            let total = rule.unit_value().checked_mul(i64::from(quantity));
            let line = match total {
                Some(total) if total > 0 => ValuationItemResult::accepted(
                    resource.clone(),
                    quantity,
                    total,
                    rule.currency().clone(),
                )
                .unwrap_or_else(|_| {
                    ValuationItemResult::rejected(
                        resource,
                        quantity,
                        DenialReason::InternalInconsistency,
                    )
                }),
                _ => ValuationItemResult::rejected(resource, quantity, DenialReason::InvalidValue),
            };
            results.push(line);
        }

        ValuationSnapshot::new(results)
    }
}
