//! Application configuration constants.
//!
//! This module centralizes the tunable values used by the stores, the quiz
//! runner and the statistics aggregator.

use serde::Deserialize;
use std::path::PathBuf;

use crate::paths;

// ==================== Storage Configuration ====================

/// Configuration file structure for config.toml
#[derive(Debug, Deserialize)]
struct AppConfig {
    storage: Option<StorageConfig>,
}

#[derive(Debug, Deserialize)]
struct StorageConfig {
    path: Option<String>,
}

/// Load storage database path with priority: config.toml > .env > default
pub fn load_database_path() -> PathBuf {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    if let Ok(contents) = std::fs::read_to_string("config.toml") {
        if let Some(path) = storage_path_from_toml(&contents) {
            tracing::info!("Using storage from config.toml: {}", path);
            return PathBuf::from(path);
        }
    }

    if let Ok(path) = std::env::var("STORAGE_PATH") {
        tracing::info!("Using storage from STORAGE_PATH env: {}", path);
        return PathBuf::from(path);
    }

    let default = PathBuf::from(paths::db_path());
    tracing::info!("Using default storage path: {}", default.display());
    default
}

fn storage_path_from_toml(contents: &str) -> Option<String> {
    match toml::from_str::<AppConfig>(contents) {
        Ok(config) => config.storage.and_then(|s| s.path),
        Err(e) => {
            tracing::warn!("Ignoring unreadable config.toml: {}", e);
            None
        }
    }
}

/// Version tag written into every persisted blob
pub const STORAGE_SCHEMA_VERSION: u32 = 1;

// ==================== Study Configuration ====================

/// A resumable study snapshot older than this is discarded on load
pub const SNAPSHOT_EXPIRY_HOURS: i64 = 24;

/// Number of distractor choices in multiple choice mode
pub const DISTRACTOR_COUNT: usize = 3;

// ==================== Deck Manager ====================

/// Description given to user decks created without one
pub const DEFAULT_DECK_DESCRIPTION: &str = "Custom deck";

pub const CUSTOM_DECK_ID_PREFIX: &str = "custom-";
pub const CUSTOM_CARD_ID_PREFIX: &str = "custom-card-";

// ==================== Statistics ====================

/// Limit for problem cards display
pub const PROBLEM_CARDS_LIMIT: usize = 5;
