//! Error types for Bursar
//!
//! Expected business conditions (denials, refusals, step failures) are
//! returned as explicit result values elsewhere; this error covers
//! programming-contract violations such as malformed construction.

use thiserror::Error;

/// Result type for Bursar operations
pub type Result<T> = std::result::Result<T, BursarError>;

/// Bursar error types
#[derive(Debug, Clone, Error)]
pub enum BursarError {
    /// Invalid input
    #[error("Invalid input: {field} - {reason}")]
    InvalidInput { field: String, reason: String },

    /// Malformed configuration
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl BursarError {
    /// Create an invalid input error
    pub fn invalid_input(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Get an error code for diagnostics
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidInput { .. } => "INVALID_INPUT",
            Self::Config { .. } => "CONFIG_ERROR",
        }
    }
}
