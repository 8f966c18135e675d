//! Shop catalog and purchase valuation

use crate::{Blacklist, ValuationService};
use bursar_types::{
    BursarError, CurrencyId, DenialReason, ExchangePayload, ExchangeRequest, ResourceCatalog,
    ResourceId, Result, ShopId, ValuationItemResult, ValuationSnapshot,
};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::Arc;

/// A priced entry in a shop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShopEntry {
    resource: ResourceId,
    price: i64,
    currency: CurrencyId,
}

impl ShopEntry {
    /// Create an entry; price must be positive
    pub fn new(resource: ResourceId, price: i64, currency: CurrencyId) -> Result<Self> {
        if price <= 0 {
            return Err(BursarError::invalid_input("price", "must be > 0"));
        }
        Ok(Self {
            resource,
            price,
            currency,
        })
    }

    pub fn resource(&self) -> &ResourceId {
        &self.resource
    }

    pub fn price(&self) -> i64 {
        self.price
    }

    pub fn currency(&self) -> &CurrencyId {
        &self.currency
    }
}

#[derive(Debug, Deserialize)]
struct EntryFile {
    resource: ResourceId,
    price: i64,
    currency: CurrencyId,
}

#[derive(Debug, Deserialize)]
struct ShopFile {
    id: ShopId,
    #[serde(default)]
    entries: Vec<EntryFile>,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    shops: Vec<ShopFile>,
}

/// Catalog of configured shops and their priced entries
#[derive(Debug, Clone, Default)]
pub struct ShopCatalog {
    shops: BTreeMap<ShopId, Vec<ShopEntry>>,
}

impl ShopCatalog {
    pub fn new(shops: BTreeMap<ShopId, Vec<ShopEntry>>) -> Self {
        Self { shops }
    }

    /// A catalog with no shops
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load a catalog from its JSON representation, validating prices
    pub fn from_json(json: &str) -> Result<Self> {
        let file: CatalogFile =
            serde_json::from_str(json).map_err(|e| BursarError::config(e.to_string()))?;
        let mut shops = BTreeMap::new();
        for shop in file.shops {
            let mut entries = Vec::with_capacity(shop.entries.len());
            for entry in shop.entries {
                entries.push(ShopEntry::new(entry.resource, entry.price, entry.currency)?);
            }
            if shops.insert(shop.id, entries).is_some() {
                return Err(BursarError::config("duplicate shop id"));
            }
        }
        Ok(Self::new(shops))
    }

    pub fn shop_count(&self) -> usize {
        self.shops.len()
    }

    /// Find the entry for a resource in a shop
    pub fn entry(&self, shop: &ShopId, resource: &ResourceId) -> Option<&ShopEntry> {
        self.shops
            .get(shop)?
            .iter()
            .find(|entry| entry.resource() == resource)
    }
}

/// Values shop purchases: cost is the listed price times the quantity.
///
/// Unknown shops and unlisted goods are rejected; blacklisted goods cannot
/// be purchased.
pub struct PurchaseValuationService {
    catalog: ShopCatalog,
    blacklist: Blacklist,
    resources: Arc<dyn ResourceCatalog>,
}

impl PurchaseValuationService {
    pub fn new(
        catalog: ShopCatalog,
        blacklist: Blacklist,
        resources: Arc<dyn ResourceCatalog>,
    ) -> Self {
        Self {
            catalog,
            blacklist,
            resources,
        }
    }
}

impl ValuationService for PurchaseValuationService {
    fn valuate(&self, request: &ExchangeRequest) -> ValuationSnapshot {
        let (shop, resource, quantity) = match request.payload() {
            ExchangePayload::ShopPurchase {
                shop,
                resource,
                quantity,
            } => (shop, resource.clone(), *quantity),
            ExchangePayload::DeclaredSale { .. } => return ValuationSnapshot::empty(),
        };

        let tags = self.resources.tags(&resource);
        if self.blacklist.is_denied(&resource, &tags) {
            return ValuationSnapshot::new(vec![ValuationItemResult::rejected(
                resource,
                quantity,
                DenialReason::InvalidContext,
            )]);
        }

        let entry = match self.catalog.entry(shop, &resource) {
            Some(entry) => entry,
            None => {
                return ValuationSnapshot::new(vec![ValuationItemResult::rejected(
                    resource,
                    quantity,
                    DenialReason::InvalidValue,
                )])
            }
        };

        let line = match entry.price().checked_mul(i64::from(quantity)) {
            Some(cost) if cost > 0 => ValuationItemResult::accepted(
                resource.clone(),
                quantity,
                cost,
                entry.currency().clone(),
            )
            .unwrap_or_else(|_| {
                ValuationItemResult::rejected(resource, quantity, DenialReason::InternalInconsistency)
            }),
            _ => ValuationItemResult::rejected(resource, quantity, DenialReason::InvalidValue),
        };
        ValuationSnapshot::new(vec![line])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bursar_types::{ExchangeIntent, PrincipalId, RequestActor, StaticCatalog};

    fn ore() -> ResourceId {
        ResourceId::new("metal.ore").unwrap()
    }

    fn coins() -> CurrencyId {
        CurrencyId::new("coins").unwrap()
    }

    fn general() -> ShopId {
        ShopId::new("general").unwrap()
    }

    fn catalog() -> ShopCatalog {
        ShopCatalog::from_json(
            r#"{
                "shops": [
                    {"id": "general", "entries": [
                        {"resource": "metal.ore", "price": 12, "currency": "coins"}
                    ]}
                ]
            }"#,
        )
        .unwrap()
    }

    fn service(blacklist: Blacklist) -> PurchaseValuationService {
        PurchaseValuationService::new(catalog(), blacklist, Arc::new(StaticCatalog::new()))
    }

    fn purchase(shop: ShopId, resource: ResourceId, quantity: u32) -> ExchangeRequest {
        ExchangeRequest::new(
            RequestActor::Console,
            ExchangeIntent::Purchase,
            PrincipalId::new(),
            ExchangePayload::shop_purchase(shop, resource, quantity).unwrap(),
        )
    }

    #[test]
    fn test_listed_purchase_costs_price_times_quantity() {
        let snapshot = service(Blacklist::empty()).valuate(&purchase(general(), ore(), 3));
        assert!(snapshot.has_any_accepted());
        assert_eq!(snapshot.totals_by_currency().get(&coins()), Some(&36));
    }

    #[test]
    fn test_unknown_shop_is_rejected() {
        let snapshot =
            service(Blacklist::empty()).valuate(&purchase(ShopId::new("mystery").unwrap(), ore(), 1));
        assert!(!snapshot.has_any_accepted());
        assert_eq!(
            snapshot.item_results()[0].denial_reason(),
            Some(DenialReason::InvalidValue)
        );
    }

    #[test]
    fn test_unlisted_resource_is_rejected() {
        let snapshot = service(Blacklist::empty())
            .valuate(&purchase(general(), ResourceId::new("void.dust").unwrap(), 1));
        assert!(!snapshot.has_any_accepted());
    }

    #[test]
    fn test_blacklisted_resource_cannot_be_purchased() {
        let blacklist = Blacklist::from_json(r#"{"deny_resources": ["metal.ore"]}"#).unwrap();
        let snapshot = service(blacklist).valuate(&purchase(general(), ore(), 1));
        assert!(!snapshot.has_any_accepted());
        assert_eq!(
            snapshot.item_results()[0].denial_reason(),
            Some(DenialReason::InvalidContext)
        );
    }

    #[test]
    fn test_catalog_rejects_non_positive_price() {
        let result = ShopCatalog::from_json(
            r#"{"shops": [{"id": "general", "entries": [
                {"resource": "metal.ore", "price": 0, "currency": "coins"}
            ]}]}"#,
        );
        assert!(result.is_err());
    }
}
