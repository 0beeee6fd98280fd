//! Storage collaborator boundary. The core reads and writes whole snapshots.

pub mod json_backend;

use std::sync::Mutex;

use crate::errors::{LedgerError, Result};
use crate::ledger::Ledger;

pub use json_backend::JsonFileStore;

/// Abstraction over persistence backends that hold one ledger snapshot.
pub trait SnapshotStore: Send + Sync {
    /// Returns `None` when nothing has been stored yet.
    fn load(&self) -> Result<Option<Ledger>>;
    fn save(&self, ledger: &Ledger) -> Result<()>;
}

/// In-process store, handy for tests and embedding.
#[derive(Default)]
pub struct MemoryStore {
    snapshot: Mutex<Option<Ledger>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ledger(ledger: Ledger) -> Self {
        Self {
            snapshot: Mutex::new(Some(ledger)),
        }
    }
}

impl SnapshotStore for MemoryStore {
    fn load(&self) -> Result<Option<Ledger>> {
        let guard = self
            .snapshot
            .lock()
            .map_err(|_| LedgerError::InvalidInput("memory store poisoned".into()))?;
        Ok(guard.clone())
    }

    fn save(&self, ledger: &Ledger) -> Result<()> {
        let mut guard = self
            .snapshot
            .lock()
            .map_err(|_| LedgerError::InvalidInput("memory store poisoned".into()))?;
        *guard = Some(ledger.clone());
        Ok(())
    }
}
