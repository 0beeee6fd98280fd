use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use tracing::{info, warn};

use super::SnapshotStore;
use crate::errors::{LedgerError, Result};
use crate::ledger::{ledger::CURRENT_SCHEMA_VERSION, Ledger};

const TMP_SUFFIX: &str = "tmp";

/// Stores the ledger snapshot as pretty-printed JSON at a fixed path.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<dir>/ledger.json`
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join("ledger.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotStore for JsonFileStore {
    fn load(&self) -> Result<Option<Ledger>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let data = fs::read_to_string(&self.path)?;
        let ledger: Ledger = serde_json::from_str(&data)?;
        if ledger.schema_version > CURRENT_SCHEMA_VERSION {
            return Err(LedgerError::InvalidInput(format!(
                "snapshot `{}` uses schema v{}, newer than supported v{}",
                self.path.display(),
                ledger.schema_version,
                CURRENT_SCHEMA_VERSION
            )));
        }
        if ledger.schema_version < CURRENT_SCHEMA_VERSION {
            warn!(
                "snapshot `{}` is schema v{}; it will be rewritten as v{} on save",
                self.path.display(),
                ledger.schema_version,
                CURRENT_SCHEMA_VERSION
            );
        }
        Ok(Some(ledger))
    }

    fn save(&self, ledger: &Ledger) -> Result<()> {
        let mut snapshot = ledger.clone();
        snapshot.schema_version = CURRENT_SCHEMA_VERSION;
        let json = serde_json::to_string_pretty(&snapshot)?;
        let tmp = tmp_path(&self.path);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &self.path)?;
        info!("saved ledger snapshot to `{}`", self.path.display());
        Ok(())
    }
}

pub(crate) fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

pub(crate) fn write_atomic(path: &Path, data: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.sync_all()?;
    Ok(())
}
