//! Process-local token store

use super::{PersistenceError, TokenStore};
use std::sync::Mutex;

/// Token store that lives only as long as the process.
///
/// Used by tests and by the CLI's `--ephemeral` mode.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds a token
    pub fn with_token(token: &str) -> Self {
        MemoryTokenStore {
            token: Mutex::new(Some(token.to_string())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn get_token(&self) -> Result<Option<String>, PersistenceError> {
        let token = self.token.lock().map_err(|_| PersistenceError::LockPoisoned)?;
        Ok(token.clone())
    }

    fn set_token(&self, token: Option<&str>) -> Result<(), PersistenceError> {
        let mut slot = self.token.lock().map_err(|_| PersistenceError::LockPoisoned)?;
        *slot = token.map(str::to_string);
        Ok(())
    }
}
