//! Bursar Mutation - Atomic, rollback-capable mutation coordination
//!
//! A positive evaluation is turned into frozen plans, and plans into
//! single-use steps coordinated by a transaction: either every step's
//! effect is observable, or none is. There is no retry logic anywhere in
//! this crate; every failure is terminal for that attempt.
//!
//! Transactions for the same principal must be serialized by the caller;
//! the kernel guarantees atomicity within one transaction, not mutual
//! exclusion across transactions.

pub mod planner;
pub mod step;
pub mod store;
pub mod surface;
pub mod transaction;

pub use planner::{CreditPlanner, PlanRefusal, PurchasePlanner};
pub use step::{CreditStep, DebitStep, GrantStep, RemovalStep, StepError};
pub use store::{BalanceStore, JsonBalanceStore, MemoryBalanceStore, StoreError};
pub use surface::{MemorySurface, ResourceSurface, Stack};
pub use transaction::{MutationTransaction, PurchaseTransaction, TransactionError};
