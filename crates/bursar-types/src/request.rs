//! The declared exchange request model
//!
//! A request is an immutable declaration of fact: who is asking, what they
//! intend, whose resources are involved, and exactly what was declared.
//! Dispatch over payload kinds is exhaustive; the kernel never probes.

use crate::{BursarError, PrincipalId, ResourceId, Result, ShopId};
use serde::{Deserialize, Serialize};

/// Who invoked the exchange
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestActor {
    /// A principal acting on their own behalf
    Principal {
        id: PrincipalId,
        permission_level: u8,
    },
    /// The server console
    Console,
    /// A scheduled or integration-driven invocation
    Automation,
}

impl RequestActor {
    /// The acting principal's id, when the actor is a principal
    pub fn principal_id(&self) -> Option<&PrincipalId> {
        match self {
            Self::Principal { id, .. } => Some(id),
            Self::Console | Self::Automation => None,
        }
    }
}

/// Declared direction of the exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExchangeIntent {
    /// Trade owned resources for currency
    Sell,
    /// Trade currency for listed goods
    Purchase,
}

/// The declarer's stance on resource metadata
///
/// Metadata the declarer marks relevant cannot be valued honestly by a
/// table keyed on resource ids alone, so valuation rejects such items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MetadataStance {
    Relevant,
    IgnoredByDeclaration,
    Undeclared,
}

/// A single declared resource line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclaredResource {
    resource: ResourceId,
    quantity: u32,
    metadata: MetadataStance,
}

impl DeclaredResource {
    /// Declare a resource line; quantity must be positive
    pub fn new(resource: ResourceId, quantity: u32, metadata: MetadataStance) -> Result<Self> {
        if quantity == 0 {
            return Err(BursarError::invalid_input("quantity", "must be > 0"));
        }
        Ok(Self {
            resource,
            quantity,
            metadata,
        })
    }

    /// Declare a line whose metadata is explicitly ignored
    pub fn ignoring_metadata(resource: ResourceId, quantity: u32) -> Result<Self> {
        Self::new(resource, quantity, MetadataStance::IgnoredByDeclaration)
    }

    pub fn resource(&self) -> &ResourceId {
        &self.resource
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn metadata(&self) -> MetadataStance {
        self.metadata
    }
}

/// The declared facts of the exchange
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExchangePayload {
    /// Resources offered for sale
    DeclaredSale { items: Vec<DeclaredResource> },
    /// A purchase from a configured shop
    ShopPurchase {
        shop: ShopId,
        resource: ResourceId,
        quantity: u32,
    },
}

impl ExchangePayload {
    /// Declare a sale; at least one item is required
    pub fn declared_sale(items: Vec<DeclaredResource>) -> Result<Self> {
        if items.is_empty() {
            return Err(BursarError::invalid_input("items", "must not be empty"));
        }
        Ok(Self::DeclaredSale { items })
    }

    /// Declare a shop purchase; quantity must be positive
    pub fn shop_purchase(shop: ShopId, resource: ResourceId, quantity: u32) -> Result<Self> {
        if quantity == 0 {
            return Err(BursarError::invalid_input("quantity", "must be > 0"));
        }
        Ok(Self::ShopPurchase {
            shop,
            resource,
            quantity,
        })
    }

    /// The intent this payload kind expresses
    pub fn intent(&self) -> ExchangeIntent {
        match self {
            Self::DeclaredSale { .. } => ExchangeIntent::Sell,
            Self::ShopPurchase { .. } => ExchangeIntent::Purchase,
        }
    }
}

/// Immutable description of an attempted exchange
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeRequest {
    actor: RequestActor,
    intent: ExchangeIntent,
    target: PrincipalId,
    payload: ExchangePayload,
}

impl ExchangeRequest {
    pub fn new(
        actor: RequestActor,
        intent: ExchangeIntent,
        target: PrincipalId,
        payload: ExchangePayload,
    ) -> Self {
        Self {
            actor,
            intent,
            target,
            payload,
        }
    }

    pub fn actor(&self) -> &RequestActor {
        &self.actor
    }

    pub fn intent(&self) -> ExchangeIntent {
        self.intent
    }

    /// The principal whose resources and balance are at stake
    pub fn target(&self) -> &PrincipalId {
        &self.target
    }

    pub fn payload(&self) -> &ExchangePayload {
        &self.payload
    }
}
