//! Test utilities for storage setup and log capture.
//!
//! Provides helpers that reuse the real storage backends, so tests exercise
//! the same migrations and envelopes as production code.

use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tracing_subscriber::fmt::MakeWriter;

use crate::storage::{self, MemoryStorage, SharedStorage, SqliteStorage, Storage, StorageError};

/// Test environment with an on-disk SQLite store in a temporary directory.
///
/// The directory is removed when the environment is dropped.
pub struct TestEnv {
    /// Temporary directory (kept alive for database file persistence)
    pub temp: TempDir,
    pub storage: SharedStorage,
}

impl TestEnv {
    pub fn new() -> storage::Result<Self> {
        let temp = TempDir::new()?;
        let storage = Arc::new(SqliteStorage::open(&temp.path().join("flashcards.db"))?);
        Ok(Self { temp, storage })
    }

    /// Get the temporary directory path for creating test files.
    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    pub fn db_path(&self) -> PathBuf {
        self.temp.path().join("flashcards.db")
    }

    /// Open a second handle on the same database file, as a restarted process would.
    pub fn reopen(&self) -> storage::Result<SharedStorage> {
        Ok(Arc::new(SqliteStorage::open(&self.db_path())?))
    }
}

/// Fresh in-memory storage as a shared handle
pub fn memory_storage() -> SharedStorage {
    Arc::new(MemoryStorage::new())
}

/// In-memory storage whose reads or writes can be made to fail per key.
///
/// Failures return `StorageError::Unavailable` until `heal` is called.
#[derive(Default)]
pub struct FlakyStorage {
    inner: MemoryStorage,
    failing_reads: Mutex<HashSet<String>>,
    failing_writes: Mutex<HashSet<String>>,
}

impl FlakyStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_reads(&self, key: &str) {
        self.failing_reads.lock().unwrap().insert(key.to_string());
    }

    /// Fail both `set_item` and `remove_item` for `key`
    pub fn fail_writes(&self, key: &str) {
        self.failing_writes.lock().unwrap().insert(key.to_string());
    }

    pub fn heal(&self) {
        self.failing_reads.lock().unwrap().clear();
        self.failing_writes.lock().unwrap().clear();
    }

    fn check(set: &Mutex<HashSet<String>>, key: &str) -> storage::Result<()> {
        if set.lock().unwrap().contains(key) {
            return Err(StorageError::Unavailable);
        }
        Ok(())
    }
}

impl Storage for FlakyStorage {
    fn get_item(&self, key: &str) -> storage::Result<Option<String>> {
        Self::check(&self.failing_reads, key)?;
        self.inner.get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> storage::Result<()> {
        Self::check(&self.failing_writes, key)?;
        self.inner.set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> storage::Result<()> {
        Self::check(&self.failing_writes, key)?;
        self.inner.remove_item(key)
    }
}

/// Shared handle to a fresh `FlakyStorage`, plus the same storage as a `SharedStorage`
pub fn flaky_storage() -> (Arc<FlakyStorage>, SharedStorage) {
    let flaky = Arc::new(FlakyStorage::new());
    let shared: SharedStorage = flaky.clone();
    (flaky, shared)
}

/// In-memory sink for formatted log lines.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    pub fn contents(&self) -> String {
        let bytes = self.0.lock().map(|b| b.clone()).unwrap_or_default();
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        if let Ok(mut bytes) = self.0.lock() {
            bytes.extend_from_slice(buf);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Run `f` with a debug-level subscriber that records everything it logs.
pub fn with_captured_logs<R>(f: impl FnOnce() -> R) -> (R, String) {
    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(logs.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();
    let result = tracing::subscriber::with_default(subscriber, f);
    (result, logs.contents())
}
