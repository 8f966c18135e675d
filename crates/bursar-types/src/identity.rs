//! Identity types for Bursar
//!
//! Principals are strongly typed wrappers around UUIDs; resource, currency,
//! and shop identifiers are validated non-blank string keys. The wrappers
//! prevent accidental mixing of different ID kinds.

use crate::{BursarError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a principal (the owner of resources and balances)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PrincipalId(pub Uuid);

impl PrincipalId {
    /// Create a new random ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from an existing UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Parse from a string
    pub fn parse(s: &str) -> std::result::Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }

    /// Get the inner UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for PrincipalId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for PrincipalId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// Macro to generate validated string-key ID types
macro_rules! define_key_type {
    ($name:ident, $field:literal, $doc:literal) => {
        #[doc = $doc]
        #[derive(
            Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new key, rejecting blank input
            pub fn new(value: impl Into<String>) -> Result<Self> {
                let value = value.into();
                if value.trim().is_empty() {
                    return Err(BursarError::invalid_input($field, "must be non-empty"));
                }
                Ok(Self(value))
            }

            /// Get the key as a string slice
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_key_type!(
    ResourceId,
    "resource_id",
    "Namespaced identifier for an ownable resource (e.g., \"metal.ore\")"
);
define_key_type!(
    CurrencyId,
    "currency_id",
    "Identifier for a configured currency (e.g., \"coins\")"
);
define_key_type!(
    ShopId,
    "shop_id",
    "Identifier for a configured shop"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_principal_id_roundtrip() {
        let id = PrincipalId::new();
        let parsed = PrincipalId::parse(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_key_types_reject_blank() {
        assert!(ResourceId::new("metal.ore").is_ok());
        assert!(ResourceId::new("").is_err());
        assert!(CurrencyId::new("   ").is_err());
        assert!(ShopId::new("general").is_ok());
    }

    #[test]
    fn test_key_type_display() {
        let id = CurrencyId::new("coins").unwrap();
        assert_eq!(id.to_string(), "coins");
        assert_eq!(id.as_str(), "coins");
    }
}
