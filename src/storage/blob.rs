//! Versioned JSON envelopes around stored values.
//!
//! Values are written as `{"version": N, "data": ...}`. Reads also accept a
//! bare payload so blobs written before versioning still load.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::{LogOnError, Result, Storage, StorageError};
use crate::config::STORAGE_SCHEMA_VERSION;

#[derive(Serialize)]
struct Envelope<'a, T> {
    version: u32,
    data: &'a T,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Stored<T> {
    Versioned { version: u32, data: T },
    Legacy(T),
}

/// Decode a raw blob stored under `key`.
pub fn decode<T: DeserializeOwned>(key: &str, raw: &str) -> serde_json::Result<T> {
    match serde_json::from_str::<Stored<T>>(raw) {
        Ok(Stored::Versioned { version, data }) => {
            if version > STORAGE_SCHEMA_VERSION {
                tracing::warn!(
                    "{} was written by schema version {} (known: {}), decoded best-effort",
                    key,
                    version,
                    STORAGE_SCHEMA_VERSION
                );
            }
            Ok(data)
        }
        Ok(Stored::Legacy(data)) => {
            tracing::debug!("{} has no version tag, read as legacy", key);
            Ok(data)
        }
        // Untagged errors are opaque; decode the bare form again for a useful message
        Err(_) => serde_json::from_str::<T>(raw),
    }
}

/// Load and decode the value stored under `key`, `None` if absent.
pub fn load_blob<T: DeserializeOwned>(storage: &dyn Storage, key: &str) -> Result<Option<T>> {
    match storage.get_item(key)? {
        Some(raw) => Ok(Some(decode(key, &raw)?)),
        None => Ok(None),
    }
}

/// Load a list for display, treating a missing, unreadable or malformed blob as empty.
pub fn load_list<T: DeserializeOwned>(storage: &dyn Storage, key: &str) -> Vec<T> {
    load_blob::<Vec<T>>(storage, key)
        .log_warn_default(&format!("Failed to load {}", key))
        .unwrap_or_default()
}

/// Load a list that is about to be rewritten.
///
/// A malformed blob reads as empty so the write replaces it, but backend
/// failures are returned: writing back after a failed read would drop every
/// stored entry.
pub fn load_list_for_write<T: DeserializeOwned>(storage: &dyn Storage, key: &str) -> Result<Vec<T>> {
    match load_blob::<Vec<T>>(storage, key) {
        Ok(items) => Ok(items.unwrap_or_default()),
        Err(StorageError::Json(e)) => {
            tracing::warn!("Replacing malformed {}: {}", key, e);
            Ok(Vec::new())
        }
        Err(e) => Err(e),
    }
}

/// Encode `value` in the current envelope and store it under `key`.
pub fn save_blob<T: Serialize>(storage: &dyn Storage, key: &str, value: &T) -> Result<()> {
    let json = serde_json::to_string(&Envelope {
        version: STORAGE_SCHEMA_VERSION,
        data: value,
    })?;
    storage.set_item(key, &json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use crate::testing::FlakyStorage;

    #[test]
    fn test_save_writes_envelope() {
        let storage = MemoryStorage::new();
        save_blob(&storage, "k", &vec![1, 2, 3]).unwrap();
        let raw = storage.get_item("k").unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["version"], STORAGE_SCHEMA_VERSION);
        assert_eq!(value["data"], serde_json::json!([1, 2, 3]));
    }

    #[test]
    fn test_legacy_bare_payload_is_read() {
        let storage = MemoryStorage::new();
        storage.set_item("k", "[4, 5]").unwrap();
        let values: Vec<i32> = load_list(&storage, "k");
        assert_eq!(values, vec![4, 5]);
    }

    #[test]
    fn test_legacy_bare_number_is_read() {
        let decoded: i64 = decode("k", "1700000000000").unwrap();
        assert_eq!(decoded, 1_700_000_000_000);
    }

    #[test]
    fn test_newer_version_decoded_best_effort() {
        let decoded: Vec<String> = decode("k", r#"{"version": 99, "data": ["a"]}"#).unwrap();
        assert_eq!(decoded, vec!["a".to_string()]);
    }

    #[test]
    fn test_malformed_list_loads_empty() {
        let storage = MemoryStorage::new();
        storage.set_item("k", "{not json").unwrap();
        let values: Vec<i32> = load_list(&storage, "k");
        assert!(values.is_empty());
    }

    #[test]
    fn test_load_for_write_replaces_malformed_blob() {
        let storage = MemoryStorage::new();
        storage.set_item("k", "{not json").unwrap();
        let values: Vec<i32> = load_list_for_write(&storage, "k").unwrap();
        assert!(values.is_empty());
    }

    #[test]
    fn test_load_for_write_propagates_backend_failure() {
        let storage = FlakyStorage::new();
        save_blob(&storage, "k", &vec![1, 2]).unwrap();
        storage.fail_reads("k");

        let loaded = load_list_for_write::<i32>(&storage, "k");
        assert!(matches!(loaded, Err(StorageError::Unavailable)));
        // Display reads still degrade to empty
        assert!(load_list::<i32>(&storage, "k").is_empty());

        storage.heal();
        assert_eq!(load_list_for_write::<i32>(&storage, "k").unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_missing_blob_is_none() {
        let storage = MemoryStorage::new();
        let value: Option<Vec<i32>> = load_blob(&storage, "missing").unwrap();
        assert!(value.is_none());
    }
}
