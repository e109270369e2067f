//! SQLite-backed snapshot store.
//!
//! Uses a plain key-value table; the snapshot is one JSON value under
//! [`SNAPSHOT_KEY`]. Other keys are free for callers that want to keep small
//! bits of UI state next to it.

use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};

use super::{data_dir, SnapshotStore};
use crate::error::{DatabaseError, Result};
use crate::state::WingsSnapshot;

pub const SNAPSHOT_KEY: &str = "wings_state_v5";

/// SQLite database holding the snapshot.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open the database at `~/.config/wings/wings.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        Self::open_at(data_dir()?.join("wings.db"))
    }

    /// Open (or create) the database at `path`.
    pub fn open_at(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(DatabaseError::from)?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key        TEXT PRIMARY KEY,
                value      TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            );",
        )?;
        Ok(())
    }

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, rusqlite::Error> {
        self.conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value, updated_at) VALUES (?1, ?2, datetime('now'))",
            params![key, value],
        )?;
        Ok(())
    }

    /// Delete a key. Missing keys are fine.
    pub fn kv_delete(&self, key: &str) -> Result<(), rusqlite::Error> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }
}

impl SnapshotStore for SqliteStore {
    fn load_raw(&self) -> Result<Option<String>> {
        Ok(self.kv_get(SNAPSHOT_KEY)?)
    }

    fn save(&self, snapshot: &WingsSnapshot) -> Result<()> {
        let json = serde_json::to_string(snapshot)?;
        self.kv_set(SNAPSHOT_KEY, &json)?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.kv_delete(SNAPSHOT_KEY)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kv_store() {
        let db = SqliteStore::open_memory().unwrap();
        assert!(db.kv_get("test").unwrap().is_none());
        db.kv_set("test", "hello").unwrap();
        assert_eq!(db.kv_get("test").unwrap().unwrap(), "hello");
        db.kv_set("test", "again").unwrap();
        assert_eq!(db.kv_get("test").unwrap().unwrap(), "again");
        db.kv_delete("test").unwrap();
        assert!(db.kv_get("test").unwrap().is_none());
    }

    #[test]
    fn snapshot_roundtrip_through_kv() {
        let db = SqliteStore::open_memory().unwrap();
        assert!(db.load().unwrap().is_none());

        let mut snapshot = WingsSnapshot::fresh(90);
        snapshot.momentum.current_streak = 4;
        snapshot.momentum.longest_streak = 4;
        db.save(&snapshot).unwrap();

        assert_eq!(db.load().unwrap(), Some(snapshot));
        db.clear().unwrap();
        assert!(db.load().unwrap().is_none());
    }

    #[test]
    fn file_database_persists_between_opens() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("wings.db");
        {
            let db = SqliteStore::open_at(&path).unwrap();
            db.save(&WingsSnapshot::fresh(20)).unwrap();
        }
        let db = SqliteStore::open_at(&path).unwrap();
        assert_eq!(db.load().unwrap().unwrap().planning.time_budget, 20);
    }
}
