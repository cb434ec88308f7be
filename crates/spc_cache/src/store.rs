//! The embedded metadata store for cache entries.
//!
//! Entries live in a single `builds` table keyed by fingerprint hex. The
//! engine behind [`MetadataStore`] is swappable; the initial engine is a
//! JSON document at `<cache_root>/cache.db` rewritten atomically on every
//! update, guarded by an exclusive lock file with a bounded acquisition
//! timeout.

use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::entry::Entry;
use crate::error::CacheError;

/// How long [`FileStore::open`] waits for the exclusive lock before
/// failing instead of hanging.
const LOCK_TIMEOUT: Duration = Duration::from_secs(1);

/// Delay between lock acquisition attempts.
const LOCK_RETRY_INTERVAL: Duration = Duration::from_millis(50);

/// Narrow adapter over the embedded key-value engine.
///
/// Keys are fingerprint hex strings; values are [`Entry`] records. Updates
/// are durable once the call returns.
pub trait MetadataStore {
    /// Looks up an entry by key. `Ok(None)` is a cache miss.
    fn get(&self, key: &str) -> Result<Option<Entry>, CacheError>;

    /// Inserts or replaces an entry.
    fn put(&mut self, key: &str, entry: &Entry) -> Result<(), CacheError>;

    /// Removes every entry.
    fn delete_all(&mut self) -> Result<(), CacheError>;

    /// Number of stored entries.
    fn count(&self) -> usize;
}

/// On-disk document format: one table of entries keyed by fingerprint.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Table {
    #[serde(default)]
    builds: BTreeMap<String, Entry>,
}

/// Exclusive lock on the store file, released when dropped.
///
/// Dropping removes the lock file on every exit path, including panics.
#[derive(Debug)]
struct StoreLock {
    path: PathBuf,
}

impl StoreLock {
    /// Acquires the lock, retrying until `timeout` elapses.
    fn acquire(path: PathBuf, timeout: Duration) -> Result<Self, CacheError> {
        let start = Instant::now();
        loop {
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(_) => return Ok(Self { path }),
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                    if start.elapsed() >= timeout {
                        return Err(CacheError::LockTimeout { path });
                    }
                    std::thread::sleep(LOCK_RETRY_INTERVAL);
                }
                Err(e) => return Err(CacheError::Io { path, source: e }),
            }
        }
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

/// File-backed [`MetadataStore`] engine.
///
/// Holds the full table in memory and rewrites the document through a
/// temporary file and rename on every update, so a crash mid-write leaves
/// the previous document intact.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    table: Table,
    _lock: StoreLock,
}

impl FileStore {
    /// Opens the store at `path`, taking the exclusive lock.
    ///
    /// Fails with [`CacheError::LockTimeout`] if another process holds the
    /// store open past the bounded timeout. A missing or corrupt document
    /// yields an empty table; corruption becomes cache misses, not errors.
    pub fn open(path: &Path) -> Result<Self, CacheError> {
        Self::open_with_timeout(path, LOCK_TIMEOUT)
    }

    /// [`FileStore::open`] with an explicit lock timeout, for tests.
    pub fn open_with_timeout(path: &Path, timeout: Duration) -> Result<Self, CacheError> {
        let lock_path = lock_path_for(path);
        let lock = StoreLock::acquire(lock_path, timeout)?;

        let table = match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_default(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Table::default(),
            Err(e) => {
                return Err(CacheError::Metadata {
                    reason: format!("failed to read {}: {e}", path.display()),
                })
            }
        };

        Ok(Self {
            path: path.to_path_buf(),
            table,
            _lock: lock,
        })
    }

    /// Writes the whole table out through a temp file and rename.
    fn persist(&self) -> Result<(), CacheError> {
        let json = serde_json::to_string(&self.table).map_err(|e| CacheError::Serialization {
            reason: e.to_string(),
        })?;

        let tmp = self.path.with_extension("db.tmp");
        std::fs::write(&tmp, json).map_err(|e| CacheError::Metadata {
            reason: format!("failed to write {}: {e}", tmp.display()),
        })?;
        std::fs::rename(&tmp, &self.path).map_err(|e| CacheError::Metadata {
            reason: format!("failed to replace {}: {e}", self.path.display()),
        })
    }
}

impl MetadataStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<Entry>, CacheError> {
        Ok(self.table.builds.get(key).cloned())
    }

    fn put(&mut self, key: &str, entry: &Entry) -> Result<(), CacheError> {
        self.table.builds.insert(key.to_string(), entry.clone());
        self.persist()
    }

    fn delete_all(&mut self) -> Result<(), CacheError> {
        self.table.builds.clear();
        self.persist()
    }

    fn count(&self) -> usize {
        self.table.builds.len()
    }
}

/// Lock file path for a store file (`cache.db` → `cache.db.lock`).
fn lock_path_for(store_path: &Path) -> PathBuf {
    let mut name = store_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    name.push_str(".lock");
    store_path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use spc_common::Fingerprint;

    fn sample_entry(success: bool) -> Entry {
        Entry {
            fingerprint: Fingerprint::from_digest([3u8; 32]),
            source_file: "/projects/app.usp".to_string(),
            target: "234".to_string(),
            compiler_version: String::new(),
            user_folders: vec![],
            timestamp: Utc::now(),
            outputs: vec!["app.ush".to_string()],
            success,
        }
    }

    #[test]
    fn put_get_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.db");
        let mut store = FileStore::open(&path).unwrap();

        let entry = sample_entry(true);
        let key = entry.fingerprint.to_string();
        store.put(&key, &entry).unwrap();

        let loaded = store.get(&key).unwrap().unwrap();
        assert_eq!(loaded.fingerprint, entry.fingerprint);
        assert_eq!(loaded.outputs, entry.outputs);
    }

    #[test]
    fn get_missing_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(&dir.path().join("cache.db")).unwrap();
        assert!(store.get("deadbeef").unwrap().is_none());
    }

    #[test]
    fn entries_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.db");
        let entry = sample_entry(true);
        let key = entry.fingerprint.to_string();

        {
            let mut store = FileStore::open(&path).unwrap();
            store.put(&key, &entry).unwrap();
        }

        let store = FileStore::open(&path).unwrap();
        assert_eq!(store.count(), 1);
        assert!(store.get(&key).unwrap().is_some());
    }

    #[test]
    fn delete_all_empties_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.db");
        let mut store = FileStore::open(&path).unwrap();
        let entry = sample_entry(false);
        store.put(&entry.fingerprint.to_string(), &entry).unwrap();
        assert_eq!(store.count(), 1);

        store.delete_all().unwrap();
        assert_eq!(store.count(), 0);

        drop(store);
        let store = FileStore::open(&path).unwrap();
        assert_eq!(store.count(), 0);
    }

    #[test]
    fn corrupt_document_opens_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.db");
        std::fs::write(&path, "not json {{{").unwrap();

        let store = FileStore::open(&path).unwrap();
        assert_eq!(store.count(), 0);
    }

    #[test]
    fn second_open_times_out_while_locked() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.db");
        let _held = FileStore::open(&path).unwrap();

        let err =
            FileStore::open_with_timeout(&path, Duration::from_millis(120)).unwrap_err();
        assert!(matches!(err, CacheError::LockTimeout { .. }));
    }

    #[test]
    fn lock_released_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.db");

        let store = FileStore::open(&path).unwrap();
        drop(store);

        // Reopening immediately must succeed.
        FileStore::open_with_timeout(&path, Duration::from_millis(50)).unwrap();
        assert!(!dir.path().join("cache.db.lock").exists());
    }

    #[test]
    fn unknown_document_keys_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.db");
        let entry = sample_entry(true);
        let key = entry.fingerprint.to_string();
        let doc = format!(
            r#"{{"builds": {{"{key}": {}}}, "schema_epoch": 2}}"#,
            serde_json::to_string(&entry).unwrap()
        );
        std::fs::write(&path, doc).unwrap();

        let store = FileStore::open(&path).unwrap();
        assert_eq!(store.count(), 1);
        assert!(store.get(&key).unwrap().is_some());
    }
}
