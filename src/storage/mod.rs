//! String-keyed JSON blob storage.
//!
//! Every persisted collection lives under its own key as one JSON document
//! that is read and written whole, the same model as browser `localStorage`.
//! Two backends are provided: SQLite for durable use and an in-memory map for
//! tests and embedding.

pub mod blob;
pub mod keys;
pub mod memory;
pub mod sqlite;

pub use blob::{decode, load_blob, load_list, load_list_for_write, save_blob};
pub use memory::MemoryStorage;
pub use sqlite::{run_migrations, SqliteStorage};

use std::sync::Arc;
use thiserror::Error;

/// Errors raised by a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backend's lock was poisoned by a panicking writer
    #[error("Storage unavailable")]
    Unavailable,
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// A flat key/value store of JSON strings.
pub trait Storage: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>>;
    fn set_item(&self, key: &str, value: &str) -> Result<()>;
    fn remove_item(&self, key: &str) -> Result<()>;
}

/// Storage handle shared by the content store and the activity log
pub type SharedStorage = Arc<dyn Storage>;

/// Extension trait for logging errors before discarding them
pub trait LogOnError<T> {
    /// Log the error at warn level and return None
    fn log_warn(self, context: &str) -> Option<T>;
    /// Log the error at warn level and return the default
    fn log_warn_default(self, context: &str) -> T
    where
        T: Default;
}

impl<T, E: std::fmt::Display> LogOnError<T> for std::result::Result<T, E> {
    fn log_warn(self, context: &str) -> Option<T> {
        match self {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!("{}: {}", context, e);
                None
            }
        }
    }

    fn log_warn_default(self, context: &str) -> T
    where
        T: Default,
    {
        match self {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!("{}: {}", context, e);
                T::default()
            }
        }
    }
}
