//! Bursar Types - Canonical domain types for the exchange kernel
//!
//! This crate contains all foundational types for Bursar with zero dependencies
//! on other bursar crates. It defines the complete type system for:
//!
//! - Identity types (PrincipalId, ResourceId, CurrencyId, ShopId)
//! - Currency definitions and minor-unit formatting
//! - The declared exchange request model
//! - Valuation results and snapshots
//! - Evaluation outcomes and audit records
//! - Frozen mutation-side plans (credit plans, mutation contexts)
//!
//! # Architectural Invariants
//!
//! These types support the core Bursar guarantees:
//!
//! 1. Requests are immutable declarations of fact, never inferred meaning
//! 2. A Pass carries the concrete valuation snapshot; no downcasting exists
//! 3. Zero or negative aggregate value is unrepresentable in snapshot totals
//! 4. Plans and mutation contexts are frozen at construction, verified positive
//! 5. Refusals are explicit values with a stable code and a human message

pub mod audit;
pub mod catalog;
pub mod currency;
pub mod denial;
pub mod error;
pub mod identity;
pub mod outcome;
pub mod plan;
pub mod refusal;
pub mod request;
pub mod valuation;

pub use audit::*;
pub use catalog::*;
pub use currency::*;
pub use denial::*;
pub use error::*;
pub use identity::*;
pub use outcome::*;
pub use plan::*;
pub use refusal::*;
pub use request::*;
pub use valuation::*;
