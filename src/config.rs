//! Store configuration.

use serde::Deserialize;

use crate::persist::StoreResult;

/// SQLite connection settings applied by
/// [`crate::persist::sqlite::SqliteRecordStore::open_with_config`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// `PRAGMA journal_mode` value.
    pub journal_mode: String,
    /// `PRAGMA synchronous` value.
    pub synchronous: String,
    /// How long a blocked writer waits for the database lock.
    pub busy_timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            journal_mode: "WAL".to_string(),
            synchronous: "NORMAL".to_string(),
            busy_timeout_ms: 5_000,
        }
    }
}

impl StoreConfig {
    /// Parses a JSON object; absent keys keep their defaults.
    pub fn from_json_str(raw: &str) -> StoreResult<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}
