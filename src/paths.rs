//! Where the flashcard database lives on disk.
//!
//! Everything is placed under one data directory, `data` unless `DATA_DIR`
//! says otherwise, so a second copy of the app can point at its own store:
//! ```bash
//! DATA_DIR=/tmp/flashcards-scratch vocab-flashcards decks
//! ```

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

static DATA_DIR: OnceLock<String> = OnceLock::new();

/// Data directory, resolved once per process
pub fn data_dir() -> &'static str {
    DATA_DIR.get_or_init(|| std::env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string()))
}

/// Default database file inside the data directory
pub fn db_path() -> String {
    format!("{}/flashcards.db", data_dir())
}

/// Copy taken of an existing database before it is opened
pub fn backup_path(db: &Path) -> PathBuf {
    let mut name = db.as_os_str().to_owned();
    name.push(".backup");
    PathBuf::from(name)
}
