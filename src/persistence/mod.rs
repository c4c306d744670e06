//! Durable storage for the session token
//!
//! The session keeps exactly one value across runs: the bearer token,
//! stored under [`TOKEN_KEY`]. Backends only need to read it and to
//! replace or clear it.

pub mod memory_store;
pub mod sqlite_store;

pub use memory_store::MemoryTokenStore;
pub use sqlite_store::SqliteTokenStore;

use thiserror::Error;

/// Key the token is stored under
pub const TOKEN_KEY: &str = "token";

/// Errors that can occur during persistence operations
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Token store lock poisoned")]
    LockPoisoned,
}

/// Trait for token persistence backends
pub trait TokenStore: Send + Sync {
    /// Read the persisted token, if any
    fn get_token(&self) -> Result<Option<String>, PersistenceError>;

    /// Replace the persisted token, or clear it with `None`
    fn set_token(&self, token: Option<&str>) -> Result<(), PersistenceError>;

    /// Remove the persisted token; clearing an empty store is not an error
    fn clear_token(&self) -> Result<(), PersistenceError> {
        self.set_token(None)
    }
}
