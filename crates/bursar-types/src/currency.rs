//! Currency definitions and minor-unit formatting
//!
//! All amounts in Bursar are integers in the minor unit of their currency;
//! `decimals` records the shift applied when rendering for humans.

use crate::{BursarError, CurrencyId, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A configured currency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyDefinition {
    /// Currency ID
    pub id: CurrencyId,
    /// Singular display name
    pub name: String,
    /// Plural display name
    pub plural_name: String,
    /// Optional symbol; when present it prefixes formatted amounts
    #[serde(default)]
    pub symbol: String,
    /// Minor-unit decimal shift (0 for whole-unit currencies)
    #[serde(default)]
    pub decimals: u8,
}

impl CurrencyDefinition {
    /// Format an amount of minor units for display
    pub fn format(&self, minor_units: i64) -> String {
        let numeric = if self.decimals == 0 {
            minor_units.to_string()
        } else {
            let scale = 10u64.pow(u32::from(self.decimals));
            let magnitude = minor_units.unsigned_abs();
            let sign = if minor_units < 0 { "-" } else { "" };
            let whole = magnitude / scale;
            let mut frac = format!(
                "{:0width$}",
                magnitude % scale,
                width = usize::from(self.decimals)
            );
            while frac.ends_with('0') {
                frac.pop();
            }
            if frac.is_empty() {
                format!("{sign}{whole}")
            } else {
                format!("{sign}{whole}.{frac}")
            }
        };
        self.decorate(numeric, minor_units)
    }

    fn decorate(&self, numeric: String, minor_units: i64) -> String {
        if !self.symbol.trim().is_empty() {
            return format!("{}{}", self.symbol, numeric);
        }
        let unit = if minor_units.unsigned_abs() == 1 {
            &self.name
        } else {
            &self.plural_name
        };
        format!("{numeric} {unit}")
    }

    /// Short human description of the currency
    pub fn describe(&self) -> String {
        let base = if self.symbol.trim().is_empty() {
            self.name.clone()
        } else {
            format!("{} ({})", self.symbol, self.name)
        };
        format!("{}, decimals={}", base, self.decimals)
    }
}

/// Serialized registry layout
#[derive(Debug, Deserialize)]
struct RegistryFile {
    default: CurrencyId,
    currencies: Vec<CurrencyDefinition>,
}

/// Registry of configured currencies with a designated default
#[derive(Debug, Clone)]
pub struct CurrencyRegistry {
    default: CurrencyId,
    currencies: BTreeMap<CurrencyId, CurrencyDefinition>,
}

impl CurrencyRegistry {
    /// Build a registry; the default must be among the definitions
    pub fn new(default: CurrencyId, definitions: Vec<CurrencyDefinition>) -> Result<Self> {
        if definitions.is_empty() {
            return Err(BursarError::invalid_input(
                "currencies",
                "must contain at least one definition",
            ));
        }
        let mut currencies = BTreeMap::new();
        for definition in definitions {
            if currencies
                .insert(definition.id.clone(), definition)
                .is_some()
            {
                return Err(BursarError::invalid_input(
                    "currencies",
                    "duplicate currency id",
                ));
            }
        }
        if !currencies.contains_key(&default) {
            return Err(BursarError::invalid_input(
                "default",
                "default currency is not defined",
            ));
        }
        Ok(Self {
            default,
            currencies,
        })
    }

    /// Load a registry from its JSON representation
    pub fn from_json(json: &str) -> Result<Self> {
        let file: RegistryFile =
            serde_json::from_str(json).map_err(|e| BursarError::config(e.to_string()))?;
        Self::new(file.default, file.currencies)
    }

    /// The default currency definition
    pub fn default_currency(&self) -> &CurrencyDefinition {
        // The constructor guarantees the default is present.
        &self.currencies[&self.default]
    }

    /// Look up a currency by id
    pub fn find(&self, id: &CurrencyId) -> Option<&CurrencyDefinition> {
        self.currencies.get(id)
    }

    /// Number of configured currencies
    pub fn currency_count(&self) -> usize {
        self.currencies.len()
    }

    /// All configured currency ids, in deterministic order
    pub fn currency_ids(&self) -> impl Iterator<Item = &CurrencyId> {
        self.currencies.keys()
    }
}
