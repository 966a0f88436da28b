/// Durable key-value storage for client state
///
/// The session layer only needs string get/set/remove. `LocalStore` keeps
/// the pairs in SQLite so they survive restarts; `MemoryStore` keeps them in
/// a map for tests and throwaway sessions.

use crate::error::{ClientError, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// String key-value capability backing the session store
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Write several pairs so that readers never observe a partial write
    fn set_many(&self, entries: &[(&str, &str)]) -> Result<()>;

    /// Remove every listed key; keys that are already absent are ignored
    fn remove_all(&self, keys: &[&str]) -> Result<()>;
}

/// SQLite-backed key-value store
pub struct LocalStore {
    conn: Mutex<Connection>,
}

impl LocalStore {
    /// Open (or create) the store at `db_path`
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Connection::open(db_path)?;
        Self::initialize(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create a store that lives only as long as this value
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::initialize(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS kv_store (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )?;
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| ClientError::Storage("Failed to lock database".to_string()))
    }
}

impl KeyValueStore for LocalStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.lock()?;
        let value = conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.set_many(&[(key, value)])
    }

    fn set_many(&self, entries: &[(&str, &str)]) -> Result<()> {
        let mut conn = self.lock()?;
        let updated_at = chrono::Utc::now().to_rfc3339();

        let tx = conn.transaction()?;
        for (key, value) in entries {
            tx.execute(
                "INSERT OR REPLACE INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)",
                params![key, value, &updated_at],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    fn remove_all(&self, keys: &[&str]) -> Result<()> {
        let mut conn = self.lock()?;

        let tx = conn.transaction()?;
        for key in keys {
            tx.execute("DELETE FROM kv_store WHERE key = ?1", params![key])?;
        }
        tx.commit()?;
        Ok(())
    }
}

/// In-memory key-value store
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| ClientError::Storage("Failed to lock memory store".to_string()))
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn set_many(&self, entries: &[(&str, &str)]) -> Result<()> {
        let mut map = self.lock()?;
        for (key, value) in entries {
            map.insert(key.to_string(), value.to_string());
        }
        Ok(())
    }

    fn remove_all(&self, keys: &[&str]) -> Result<()> {
        let mut map = self.lock()?;
        for key in keys {
            map.remove(*key);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_initialize_creates_table() {
        let store = LocalStore::in_memory().unwrap();
        let conn = store.lock().unwrap();
        let mut stmt = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table'")
            .unwrap();
        let tables: Vec<String> = stmt
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap();

        assert!(tables.contains(&"kv_store".to_string()));
    }

    #[test]
    fn test_set_and_get() {
        let store = LocalStore::in_memory().unwrap();
        store.set("authToken", "abc").unwrap();
        assert_eq!(store.get("authToken").unwrap().as_deref(), Some("abc"));
    }

    #[test]
    fn test_get_missing_key_returns_none() {
        let store = LocalStore::in_memory().unwrap();
        assert!(store.get("missing").unwrap().is_none());
    }

    #[test]
    fn test_set_overwrites() {
        let store = LocalStore::in_memory().unwrap();
        store.set("userId", "1").unwrap();
        store.set("userId", "2").unwrap();
        assert_eq!(store.get("userId").unwrap().as_deref(), Some("2"));
    }

    #[test]
    fn test_remove_all_ignores_missing_keys() {
        let store = LocalStore::in_memory().unwrap();
        store.set_many(&[("a", "1"), ("b", "2")]).unwrap();
        store.remove_all(&["a", "b", "c"]).unwrap();
        assert!(store.get("a").unwrap().is_none());
        assert!(store.get("b").unwrap().is_none());
        store.remove_all(&["a", "b"]).unwrap();
    }

    #[test]
    fn test_values_survive_reopen() {
        let temp_dir = tempdir().unwrap();
        let db_path = temp_dir.path().join("session.db");
        {
            let store = LocalStore::new(&db_path).unwrap();
            store.set_many(&[("authToken", "tok"), ("userId", "7")]).unwrap();
        }
        let reopened = LocalStore::new(&db_path).unwrap();
        assert_eq!(reopened.get("authToken").unwrap().as_deref(), Some("tok"));
        assert_eq!(reopened.get("userId").unwrap().as_deref(), Some("7"));
    }

    #[test]
    fn test_memory_store_behaves_like_local_store() {
        let store = MemoryStore::new();
        store.set_many(&[("authToken", "tok"), ("userId", "7")]).unwrap();
        assert_eq!(store.get("userId").unwrap().as_deref(), Some("7"));
        store.remove_all(&["authToken", "userId", "other"]).unwrap();
        assert!(store.get("authToken").unwrap().is_none());
    }
}
