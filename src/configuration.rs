use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Where the store lives and how each per-operation connection is set up.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub path: PathBuf,
    /// Enables `PRAGMA foreign_keys` on connections used for writes.
    pub foreign_keys: bool,
    pub busy_timeout_ms: u64,
    pub journal_mode: Option<String>,
    pub synchronous: Option<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("bookkeeper.db"),
            foreign_keys: true,
            busy_timeout_ms: 500,
            journal_mode: Some("WAL".to_string()),
            synchronous: Some("NORMAL".to_string()),
        }
    }
}

impl StoreConfig {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn with_foreign_keys(mut self, enabled: bool) -> Self {
        self.foreign_keys = enabled;
        self
    }

    pub fn with_busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn with_journal_mode(mut self, mode: Option<&str>) -> Self {
        self.journal_mode = mode.map(str::to_string);
        self
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}

impl From<&Path> for StoreConfig {
    fn from(path: &Path) -> Self {
        StoreConfig::new(path)
    }
}

impl From<PathBuf> for StoreConfig {
    fn from(path: PathBuf) -> Self {
        StoreConfig::new(path)
    }
}

impl From<&PathBuf> for StoreConfig {
    fn from(path: &PathBuf) -> Self {
        StoreConfig::new(path)
    }
}

impl From<&str> for StoreConfig {
    fn from(path: &str) -> Self {
        StoreConfig::new(path)
    }
}
