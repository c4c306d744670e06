//! SQLite implementation of the TokenStore trait

use super::{PersistenceError, TokenStore, TOKEN_KEY};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// SQLite-based token storage
///
/// Keeps the session token in a single-row key-value table so a sign-in
/// survives between CLI invocations.
pub struct SqliteTokenStore {
    conn: Mutex<Connection>,
}

impl SqliteTokenStore {
    /// Open (or create) the store at the specified path
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self, PersistenceError> {
        if let Some(parent) = db_path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(db_path)?;
        let store = SqliteTokenStore {
            conn: Mutex::new(conn),
        };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Create an in-memory SQLite database (useful for testing)
    pub fn in_memory() -> Result<Self, PersistenceError> {
        let conn = Connection::open_in_memory()?;
        let store = SqliteTokenStore {
            conn: Mutex::new(conn),
        };
        store.initialize_schema()?;
        Ok(store)
    }

    fn initialize_schema(&self) -> Result<(), PersistenceError> {
        let conn = self.lock()?;
        conn.execute_batch(include_str!("schema.sql"))?;
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, PersistenceError> {
        self.conn.lock().map_err(|_| PersistenceError::LockPoisoned)
    }
}

impl TokenStore for SqliteTokenStore {
    fn get_token(&self) -> Result<Option<String>, PersistenceError> {
        let conn = self.lock()?;
        let token = conn
            .query_row(
                "SELECT value FROM session_kv WHERE key = ?",
                params![TOKEN_KEY],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(token)
    }

    fn set_token(&self, token: Option<&str>) -> Result<(), PersistenceError> {
        let conn = self.lock()?;
        match token {
            Some(value) => {
                conn.execute(
                    "INSERT OR REPLACE INTO session_kv (key, value, updated_at) VALUES (?, ?, ?)",
                    params![TOKEN_KEY, value, chrono::Utc::now().timestamp()],
                )?;
            }
            None => {
                conn.execute("DELETE FROM session_kv WHERE key = ?", params![TOKEN_KEY])?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_empty_store() {
        let store = SqliteTokenStore::in_memory().unwrap();
        assert_eq!(store.get_token().unwrap(), None);
    }

    #[test]
    fn test_replace_token() {
        let store = SqliteTokenStore::in_memory().unwrap();

        store.set_token(Some("first")).unwrap();
        store.set_token(Some("second")).unwrap();

        assert_eq!(store.get_token().unwrap().as_deref(), Some("second"));
    }

    #[test]
    fn test_clear_is_idempotent() {
        let store = SqliteTokenStore::in_memory().unwrap();

        store.set_token(Some("abc")).unwrap();
        store.clear_token().unwrap();
        store.clear_token().unwrap();

        assert_eq!(store.get_token().unwrap(), None);
    }

    #[test]
    fn test_token_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state").join("session.db");

        {
            let store = SqliteTokenStore::new(&path).unwrap();
            store.set_token(Some("persisted-token")).unwrap();
        }

        let reopened = SqliteTokenStore::new(&path).unwrap();
        assert_eq!(reopened.get_token().unwrap().as_deref(), Some("persisted-token"));
    }
}
