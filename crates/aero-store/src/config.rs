//! Store configuration
//!
//! Loaded from TOML, then optionally overridden from the environment:
//!
//! ```toml
//! path = "data/aero.db"
//! busy_timeout_ms = 2000
//! journal_mode = "wal"
//! foreign_keys = true
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::{config_error, Result};

pub const ENV_DB_PATH: &str = "AERO_DB_PATH";
pub const ENV_BUSY_TIMEOUT_MS: &str = "AERO_BUSY_TIMEOUT_MS";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JournalMode {
    #[default]
    Wal,
    Delete,
    Memory,
}

impl JournalMode {
    pub fn as_pragma(&self) -> &'static str {
        match self {
            JournalMode::Wal => "WAL",
            JournalMode::Delete => "DELETE",
            JournalMode::Memory => "MEMORY",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// Database file; `None` opens a private in-memory database
    pub path: Option<PathBuf>,
    /// Upper bound on lock and busy waits, per operation
    pub busy_timeout_ms: u64,
    pub journal_mode: JournalMode,
    pub foreign_keys: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: None,
            busy_timeout_ms: 5_000,
            journal_mode: JournalMode::Wal,
            foreign_keys: true,
        }
    }
}

impl StoreConfig {
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::default()
        }
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }

    /// # Errors
    ///
    /// `Serialization` storage error if the TOML is malformed.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        toml::from_str(source).map_err(|e| config_error(format!("invalid store config: {}", e)))
    }

    /// # Errors
    ///
    /// `Serialization` storage error if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|e| config_error(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_toml_str(&source)
    }

    /// Apply `AERO_DB_PATH` and `AERO_BUSY_TIMEOUT_MS` from the process environment
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides from `lookup`; unparsable values are ignored
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(ENV_DB_PATH).filter(|p| !p.is_empty()) {
            self.path = Some(PathBuf::from(path));
        }
        if let Some(raw) = lookup(ENV_BUSY_TIMEOUT_MS) {
            match raw.parse::<u64>() {
                Ok(ms) => self.busy_timeout_ms = ms,
                Err(_) => tracing::warn!(
                    var = ENV_BUSY_TIMEOUT_MS,
                    value = %raw,
                    "ignoring non-numeric busy timeout override"
                ),
            }
        }
        self
    }
}
