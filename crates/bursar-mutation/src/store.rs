//! Balance store collaborators
//!
//! The store is the only place balances change. Failure here is a hard
//! stop for the surrounding transaction and requires rollback of
//! everything already applied.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use bursar_types::{CurrencyId, PrincipalId};
use parking_lot::Mutex;
use thiserror::Error;
use uuid::Uuid;

/// Balance store failures
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("balance store I/O failure: {0}")]
    Io(String),

    #[error("balance store data is malformed: {0}")]
    Malformed(String),
}

impl StoreError {
    /// Stable, machine-checkable code
    pub fn code(&self) -> &'static str {
        "STORAGE_ERROR"
    }
}

/// Persistent balance store
pub trait BalanceStore: Send + Sync {
    fn balance(&self, account: &PrincipalId, currency: &CurrencyId) -> Result<i64, StoreError>;

    fn apply_delta(
        &self,
        account: &PrincipalId,
        currency: &CurrencyId,
        delta: i64,
    ) -> Result<(), StoreError>;
}

/// Non-persistent, thread-safe store for tests and diagnostic flows
#[derive(Debug, Default)]
pub struct MemoryBalanceStore {
    balances: Mutex<HashMap<PrincipalId, BTreeMap<CurrencyId, i64>>>,
}

impl MemoryBalanceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BalanceStore for MemoryBalanceStore {
    fn balance(&self, account: &PrincipalId, currency: &CurrencyId) -> Result<i64, StoreError> {
        let balances = self.balances.lock();
        Ok(balances
            .get(account)
            .and_then(|by_currency| by_currency.get(currency))
            .copied()
            .unwrap_or(0))
    }

    fn apply_delta(
        &self,
        account: &PrincipalId,
        currency: &CurrencyId,
        delta: i64,
    ) -> Result<(), StoreError> {
        let mut balances = self.balances.lock();
        let slot = balances
            .entry(account.clone())
            .or_default()
            .entry(currency.clone())
            .or_insert(0);
        *slot = slot.saturating_add(delta);
        Ok(())
    }
}

type BalanceFile = BTreeMap<Uuid, BTreeMap<CurrencyId, i64>>;

/// JSON-backed balance store.
///
/// Not for performance; intended as a simple, auditable default. The file
/// is re-read before every operation and written after every delta, so
/// external edits between operations are picked up.
pub struct JsonBalanceStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonBalanceStore {
    /// Open a store at the given path, creating an empty file if absent
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let store = Self {
            path: path.into(),
            lock: Mutex::new(()),
        };
        if !store.path.exists() {
            store.save(&BalanceFile::new())?;
        }
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BalanceFile, StoreError> {
        let raw = fs::read_to_string(&self.path).map_err(|e| StoreError::Io(e.to_string()))?;
        if raw.trim().is_empty() {
            return Ok(BalanceFile::new());
        }
        serde_json::from_str(&raw).map_err(|e| StoreError::Malformed(e.to_string()))
    }

    fn save(&self, balances: &BalanceFile) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| StoreError::Io(e.to_string()))?;
            }
        }
        let raw =
            serde_json::to_string_pretty(balances).map_err(|e| StoreError::Io(e.to_string()))?;
        fs::write(&self.path, raw).map_err(|e| StoreError::Io(e.to_string()))
    }
}

impl BalanceStore for JsonBalanceStore {
    fn balance(&self, account: &PrincipalId, currency: &CurrencyId) -> Result<i64, StoreError> {
        let _guard = self.lock.lock();
        let balances = self.load()?;
        Ok(balances
            .get(account.as_uuid())
            .and_then(|by_currency| by_currency.get(currency))
            .copied()
            .unwrap_or(0))
    }

    fn apply_delta(
        &self,
        account: &PrincipalId,
        currency: &CurrencyId,
        delta: i64,
    ) -> Result<(), StoreError> {
        let _guard = self.lock.lock();
        let mut balances = self.load()?;
        let slot = balances
            .entry(*account.as_uuid())
            .or_default()
            .entry(currency.clone())
            .or_insert(0);
        *slot = slot.saturating_add(delta);
        self.save(&balances)
    }
}
