use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::currency::{CurrencyCode, DateFormatStyle};
use crate::errors::{LedgerError, Result};
use crate::ledger::ProjectId;
use crate::storage::json_backend::{tmp_path, write_atomic};

const DEFAULT_DIR_NAME: &str = ".shared_ledger";
const CONFIG_FILE: &str = "config.json";
const HOME_ENV: &str = "SHARED_LEDGER_HOME";

/// Application preferences that live outside any single ledger.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub date_format: DateFormatStyle,
    pub default_currency: CurrencyCode,
    /// Target of imports that name no project.
    pub default_project: ProjectId,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            date_format: DateFormatStyle::default(),
            default_currency: CurrencyCode::default(),
            default_project: ProjectId::default_project(),
        }
    }
}

impl Config {
    /// `$SHARED_LEDGER_HOME`, else `~/.shared_ledger`.
    pub fn resolve_default_dir() -> PathBuf {
        if let Some(custom) = std::env::var_os(HOME_ENV) {
            return PathBuf::from(custom);
        }
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(DEFAULT_DIR_NAME)
    }
}

pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn with_base_dir(base: &Path) -> Self {
        Self::new(base.join(CONFIG_FILE))
    }

    pub fn default_location() -> Self {
        Self::with_base_dir(&Config::resolve_default_dir())
    }

    /// Loads the stored config; a missing file yields the defaults.
    pub fn load(&self) -> Result<Config> {
        if !self.path.exists() {
            debug!("no config at `{}`, using defaults", self.path.display());
            return Ok(Config::default());
        }
        let data = fs::read_to_string(&self.path)?;
        serde_json::from_str(&data).map_err(|err| {
            LedgerError::Config(format!("`{}` is not valid: {err}", self.path.display()))
        })
    }

    pub fn save(&self, config: &Config) -> Result<()> {
        let json = serde_json::to_string_pretty(config)?;
        let tmp = tmp_path(&self.path);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
