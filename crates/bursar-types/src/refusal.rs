//! Refusal values
//!
//! A refusal is a non-exceptional, explicit "cannot proceed" result. It is
//! operational, not economic: it never stands in for a denial reason.

use crate::{BursarError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An explicit refusal carrying a stable code and a human-readable message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Refusal {
    code: String,
    message: String,
}

impl Refusal {
    /// Create a refusal; both fields must be non-blank
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Result<Self> {
        let code = code.into();
        let message = message.into();
        if code.trim().is_empty() {
            return Err(BursarError::invalid_input("code", "must be non-empty"));
        }
        if message.trim().is_empty() {
            return Err(BursarError::invalid_input("message", "must be non-empty"));
        }
        Ok(Self { code, message })
    }

    /// The stable, machine-checkable refusal code
    pub fn code(&self) -> &str {
        &self.code
    }

    /// The human-readable message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for Refusal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}
