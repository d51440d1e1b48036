//! SQLite-backed preference store.

use crate::key::{PreferenceKey, PreferenceValue};
use crate::store::PreferenceStore;
use crate::{AppIdentity, PrefsError, Result};
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;

/// Persists preferences in a single `settings` key/value table.
///
/// Values are stored as JSON so a row can hold any [`PreferenceValue`].
pub struct SqlitePreferenceStore {
    conn: Mutex<Connection>,
}

impl SqlitePreferenceStore {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.conn.lock().map_err(|_| PrefsError::Poisoned)?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            "#,
        )?;
        Ok(())
    }

    fn read(&self, storage_key: &str) -> Result<Option<PreferenceValue>> {
        let conn = self.conn.lock().map_err(|_| PrefsError::Poisoned)?;
        let json: Option<String> = conn
            .query_row(
                "SELECT value FROM settings WHERE key = ?1",
                [storage_key],
                |row| row.get(0),
            )
            .optional()?;

        match json {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// Number of stored rows.
    pub fn len(&self) -> Result<usize> {
        let conn = self.conn.lock().map_err(|_| PrefsError::Poisoned)?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM settings", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

impl PreferenceStore for SqlitePreferenceStore {
    fn get(&self, key: PreferenceKey, identity: Option<&AppIdentity>) -> Option<PreferenceValue> {
        let storage_key = key.storage_key(identity);
        match self.read(&storage_key) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key = %storage_key, error = %e, "failed to read preference");
                None
            }
        }
    }

    fn put(
        &self,
        key: PreferenceKey,
        identity: Option<&AppIdentity>,
        value: PreferenceValue,
    ) -> Result<()> {
        let json = serde_json::to_string(&value)?;
        let conn = self.conn.lock().map_err(|_| PrefsError::Poisoned)?;
        conn.execute(
            "INSERT OR REPLACE INTO settings (key, value) VALUES (?1, ?2)",
            (key.storage_key(identity), json),
        )?;
        Ok(())
    }

    fn remove(&self, key: PreferenceKey, identity: Option<&AppIdentity>) -> Result<()> {
        let conn = self.conn.lock().map_err(|_| PrefsError::Poisoned)?;
        conn.execute(
            "DELETE FROM settings WHERE key = ?1",
            [key.storage_key(identity)],
        )?;
        Ok(())
    }
}
