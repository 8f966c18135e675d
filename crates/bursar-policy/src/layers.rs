//! Built-in policy layers
//!
//! These layers cover the eligibility concerns the kernel can decide from
//! the request alone: declared-intent legitimacy and permission thresholds.
//! Anything platform-specific belongs to adapter-supplied layers.

use crate::{PolicyDecision, PolicyLayer};
use bursar_types::{
    BursarError, DenialReason, ExchangeIntent, ExchangeRequest, RequestActor, Result,
};
use serde::{Deserialize, Serialize};

/// Allows every request. Useful for bootstrap wiring and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl PolicyLayer for AllowAll {
    fn evaluate(&self, _request: &ExchangeRequest) -> PolicyDecision {
        PolicyDecision::Allow
    }
}

/// Denies requests whose declared intent does not match their payload kind.
///
/// A request declaring a sale but carrying purchase facts (or the reverse)
/// is not a legitimate declaration.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntentIntegrityLayer;

impl PolicyLayer for IntentIntegrityLayer {
    fn evaluate(&self, request: &ExchangeRequest) -> PolicyDecision {
        if request.payload().intent() == request.intent() {
            PolicyDecision::Allow
        } else {
            PolicyDecision::Deny(DenialReason::InvalidContext)
        }
    }
}

/// Permission level thresholds per exchange intent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PermissionRules {
    /// Minimum level to sell owned resources
    pub sell: u8,
    /// Minimum level to purchase from shops
    pub purchase: u8,
}

impl Default for PermissionRules {
    fn default() -> Self {
        Self {
            sell: 0,
            purchase: 0,
        }
    }
}

impl PermissionRules {
    /// Load thresholds from JSON; absent fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| BursarError::config(e.to_string()))
    }

    fn required_for(&self, intent: ExchangeIntent) -> u8 {
        match intent {
            ExchangeIntent::Sell => self.sell,
            ExchangeIntent::Purchase => self.purchase,
        }
    }
}

/// Denies principals whose permission level is below the configured
/// threshold for the declared intent. Console and automation actors pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct PermissionLayer {
    rules: PermissionRules,
}

impl PermissionLayer {
    pub fn new(rules: PermissionRules) -> Self {
        Self { rules }
    }
}

impl PolicyLayer for PermissionLayer {
    fn evaluate(&self, request: &ExchangeRequest) -> PolicyDecision {
        match request.actor() {
            RequestActor::Principal {
                permission_level, ..
            } => {
                if *permission_level >= self.rules.required_for(request.intent()) {
                    PolicyDecision::Allow
                } else {
                    PolicyDecision::Deny(DenialReason::NoPermission)
                }
            }
            RequestActor::Console | RequestActor::Automation => PolicyDecision::Allow,
        }
    }
}
