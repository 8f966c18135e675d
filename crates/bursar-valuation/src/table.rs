//! Rule-based valuation configuration
//!
//! Rules carry a matcher, currency, unit value, and priority. Resolution
//! prefers higher priority, then higher specificity (resource over tag
//! over default). The blacklist is absolute regardless of valuation.

use bursar_types::{BursarError, CurrencyId, ResourceId, Result};
use serde::Deserialize;
use std::collections::BTreeSet;

/// What a valuation rule applies to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleMatcher {
    /// A single resource id
    Resource(ResourceId),
    /// Every resource carrying the tag
    Tag(String),
    /// Every resource
    Default,
}

impl RuleMatcher {
    fn specificity(&self) -> u8 {
        match self {
            Self::Resource(_) => 2,
            Self::Tag(_) => 1,
            Self::Default => 0,
        }
    }

    fn matches(&self, resource: &ResourceId, tags: &BTreeSet<String>) -> bool {
        match self {
            Self::Resource(id) => id == resource,
            Self::Tag(tag) => tags.contains(tag),
            Self::Default => true,
        }
    }
}

/// A single valuation rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValuationRule {
    matcher: RuleMatcher,
    currency: CurrencyId,
    unit_value: i64,
    priority: i32,
}

impl ValuationRule {
    /// Create a rule; unit value must be positive
    pub fn new(
        matcher: RuleMatcher,
        currency: CurrencyId,
        unit_value: i64,
        priority: i32,
    ) -> Result<Self> {
        if unit_value <= 0 {
            return Err(BursarError::invalid_input("unit_value", "must be > 0"));
        }
        Ok(Self {
            matcher,
            currency,
            unit_value,
            priority,
        })
    }

    pub fn matcher(&self) -> &RuleMatcher {
        &self.matcher
    }

    pub fn currency(&self) -> &CurrencyId {
        &self.currency
    }

    pub fn unit_value(&self) -> i64 {
        self.unit_value
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }
}

/// Serialized rule layout: exactly one of resource/tag/default
#[derive(Debug, Deserialize)]
struct RuleFile {
    #[serde(default)]
    resource: Option<ResourceId>,
    #[serde(default)]
    tag: Option<String>,
    #[serde(default)]
    default: bool,
    currency: CurrencyId,
    value: i64,
    #[serde(default)]
    priority: i32,
}

#[derive(Debug, Deserialize)]
struct TableFile {
    #[serde(default)]
    rules: Vec<RuleFile>,
}

/// Ordered valuation rule table
#[derive(Debug, Clone, Default)]
pub struct ValuationTable {
    rules: Vec<ValuationRule>,
}

impl ValuationTable {
    pub fn new(rules: Vec<ValuationRule>) -> Self {
        Self { rules }
    }

    /// A table with no rules; every lookup resolves to nothing
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load a table from its JSON representation, validating each rule
    pub fn from_json(json: &str) -> Result<Self> {
        let file: TableFile =
            serde_json::from_str(json).map_err(|e| BursarError::config(e.to_string()))?;
        let mut rules = Vec::with_capacity(file.rules.len());
        for entry in file.rules {
            let matcher = match (entry.resource, entry.tag, entry.default) {
                (Some(resource), None, false) => RuleMatcher::Resource(resource),
                (None, Some(tag), false) => RuleMatcher::Tag(tag),
                (None, None, true) => RuleMatcher::Default,
                _ => {
                    return Err(BursarError::config(
                        "rule must set exactly one of resource, tag, default",
                    ))
                }
            };
            rules.push(ValuationRule::new(
                matcher,
                entry.currency,
                entry.value,
                entry.priority,
            )?);
        }
        Ok(Self::new(rules))
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Resolve the best rule for a resource: highest priority wins, then
    /// highest specificity; earlier rules win remaining ties.
    pub fn resolve(&self, resource: &ResourceId, tags: &BTreeSet<String>) -> Option<&ValuationRule> {
        let mut best: Option<&ValuationRule> = None;
        for rule in &self.rules {
            if !rule.matcher.matches(resource, tags) {
                continue;
            }
            let better = match best {
                None => true,
                Some(current) => {
                    rule.priority > current.priority
                        || (rule.priority == current.priority
                            && rule.matcher.specificity() > current.matcher.specificity())
                }
            };
            if better {
                best = Some(rule);
            }
        }
        best
    }
}

/// Serialized blacklist layout
#[derive(Debug, Deserialize, Default)]
struct BlacklistFile {
    #[serde(default)]
    deny_resources: BTreeSet<ResourceId>,
    #[serde(default)]
    deny_tags: BTreeSet<String>,
}

/// Resource and tag deny-sets
#[derive(Debug, Clone, Default)]
pub struct Blacklist {
    deny_resources: BTreeSet<ResourceId>,
    deny_tags: BTreeSet<String>,
}

impl Blacklist {
    pub fn new(deny_resources: BTreeSet<ResourceId>, deny_tags: BTreeSet<String>) -> Self {
        Self {
            deny_resources,
            deny_tags,
        }
    }

    /// A blacklist denying nothing
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let file: BlacklistFile =
            serde_json::from_str(json).map_err(|e| BursarError::config(e.to_string()))?;
        Ok(Self::new(file.deny_resources, file.deny_tags))
    }

    pub fn is_denied(&self, resource: &ResourceId, tags: &BTreeSet<String>) -> bool {
        self.deny_resources.contains(resource) || tags.iter().any(|t| self.deny_tags.contains(t))
    }
}
