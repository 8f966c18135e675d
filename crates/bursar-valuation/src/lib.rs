//! Bursar Valuation - Pure computation of declared value
//!
//! A valuation service evaluates value, produces a snapshot, and mutates
//! nothing. Read-only access to static configuration is permitted; items
//! without an explicit configured value are rejected.

use std::sync::Arc;

use bursar_types::{ExchangePayload, ExchangeRequest, ValuationSnapshot};

pub mod shop;
pub mod table;

mod sale;

pub use sale::TableValuationService;
pub use shop::{PurchaseValuationService, ShopCatalog, ShopEntry};
pub use table::{Blacklist, RuleMatcher, ValuationRule, ValuationTable};

/// Performs valuation evaluation
pub trait ValuationService: Send + Sync {
    fn valuate(&self, request: &ExchangeRequest) -> ValuationSnapshot;
}

/// Routes valuation based on payload kind
pub struct CompositeValuationService {
    sale: Arc<dyn ValuationService>,
    purchase: Arc<dyn ValuationService>,
}

impl CompositeValuationService {
    pub fn new(sale: Arc<dyn ValuationService>, purchase: Arc<dyn ValuationService>) -> Self {
        Self { sale, purchase }
    }
}

impl ValuationService for CompositeValuationService {
    fn valuate(&self, request: &ExchangeRequest) -> ValuationSnapshot {
        match request.payload() {
            ExchangePayload::DeclaredSale { .. } => self.sale.valuate(request),
            ExchangePayload::ShopPurchase { .. } => self.purchase.valuate(request),
        }
    }
}
