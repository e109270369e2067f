mod config;
pub mod database;
pub mod snapshot;

pub use config::{Config, EngineConfig, StorageBackend, StorageConfig};
pub use database::SqliteStore;
pub use snapshot::JsonFileStore;

use std::path::PathBuf;

use crate::error::{ConfigError, Result};
use crate::state::WingsSnapshot;

/// Durable home for the single engine snapshot.
///
/// Implementations only move bytes; they never interpret the state. Version
/// checks happen when the engine is rebuilt from a loaded snapshot.
pub trait SnapshotStore {
    /// The stored JSON text. `Ok(None)` when nothing has been saved yet.
    fn load_raw(&self) -> Result<Option<String>>;

    /// `Ok(None)` when nothing has been saved yet.
    fn load(&self) -> Result<Option<WingsSnapshot>> {
        match self.load_raw()? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    fn save(&self, snapshot: &WingsSnapshot) -> Result<()>;

    /// Remove the stored snapshot, if any.
    fn clear(&self) -> Result<()>;
}

impl<S: SnapshotStore + ?Sized> SnapshotStore for Box<S> {
    fn load_raw(&self) -> Result<Option<String>> {
        (**self).load_raw()
    }

    fn save(&self, snapshot: &WingsSnapshot) -> Result<()> {
        (**self).save(snapshot)
    }

    fn clear(&self) -> Result<()> {
        (**self).clear()
    }
}

/// Schema version of stored snapshot text, read without decoding the rest.
///
/// `Ok(None)` when the text is JSON but carries no string `version`.
///
/// # Errors
/// Returns an error if `raw` is not JSON at all.
pub fn stored_version(raw: &str) -> Result<Option<String>> {
    let value: serde_json::Value = serde_json::from_str(raw)?;
    Ok(value
        .get("version")
        .and_then(serde_json::Value::as_str)
        .map(str::to_string))
}

/// Returns `~/.config/wings[-dev]/` based on WINGS_ENV.
///
/// Set WINGS_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("WINGS_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("wings-dev")
    } else {
        base_dir.join("wings")
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}

/// Open the backend selected in `config`, under [`data_dir`].
pub fn open_store(config: &StorageConfig) -> Result<Box<dyn SnapshotStore>> {
    Ok(match config.backend {
        StorageBackend::Json => Box::new(JsonFileStore::open()?),
        StorageBackend::Sqlite => Box::new(SqliteStore::open()?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_version_ignores_the_rest_of_the_shape() {
        let raw = r#"{"version":"3.1","level":"beginner","daily":[1,2,3]}"#;
        assert_eq!(stored_version(raw).unwrap().as_deref(), Some("3.1"));
        assert_eq!(stored_version(r#"{"level":2}"#).unwrap(), None);
        assert!(stored_version("{ not json").is_err());
    }
}
