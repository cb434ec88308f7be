//! High-level cache orchestrator.
//!
//! The `Cache` type binds the fingerprinter, artifact classifier, artifact
//! store, and metadata store into a single interface for the build driver:
//! look up an entry by (source, configuration), store a finished build's
//! artifacts, restore a hit back into the source tree, clear, and report
//! statistics.

use std::path::{Path, PathBuf};

use chrono::Utc;
use spc_config::Config;

use crate::artifact::{copy_artifacts, restore_artifacts};
use crate::classify::{collect_outputs, collect_shared, WORK_DIR};
use crate::entry::Entry;
use crate::error::CacheError;
use crate::fingerprint::fingerprint_source;
use crate::store::{FileStore, MetadataStore};

/// Default cache directory name, created in the working directory.
pub const DEFAULT_CACHE_DIR: &str = ".spc-cache";

/// Metadata store file name within the cache root.
const STORE_FILE: &str = "cache.db";

/// Subdirectory holding per-entry artifact trees.
const ARTIFACTS_DIR: &str = "artifacts";

/// Subdirectory holding the shared-file pool.
const SHARED_DIR: &str = "shared";

/// Well-known shared files checked before replaying the pool on restore.
/// If any one is present in the destination working directory, the rest
/// are assumed present too.
const SHARED_SENTINELS: [&str; 3] = ["Version.ini", "ManagedUtilities.dll", "SplusLibrary.dll"];

/// Cache statistics reported by [`Cache::stats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of entries in the metadata store.
    pub entries: usize,
    /// Total size in bytes of the per-entry artifact trees.
    pub artifact_bytes: u64,
}

/// Manages build artifacts and metadata under one cache root.
///
/// Entry metadata lives in the locked metadata store; per-entry artifacts
/// under `artifacts/<fingerprint>/`; files shared by every build in a
/// directory (runtime libraries, config) under `shared/`, each stored at
/// most once and never overwritten.
pub struct Cache {
    root: PathBuf,
    store: Box<dyn MetadataStore>,
}

impl Cache {
    /// Opens (creating if needed) the cache at `cache_root`, defaulting to
    /// [`DEFAULT_CACHE_DIR`] in the current working directory.
    ///
    /// Takes the exclusive metadata-store lock; fails within a bounded
    /// timeout if another process holds the cache open.
    pub fn new(cache_root: Option<&Path>) -> Result<Self, CacheError> {
        let root = match cache_root {
            Some(root) => root.to_path_buf(),
            None => {
                let cwd = std::env::current_dir().map_err(|e| CacheError::Io {
                    path: PathBuf::from("."),
                    source: e,
                })?;
                cwd.join(DEFAULT_CACHE_DIR)
            }
        };

        std::fs::create_dir_all(&root).map_err(|e| CacheError::Io {
            path: root.clone(),
            source: e,
        })?;

        let store = FileStore::open(&root.join(STORE_FILE))?;
        Ok(Self {
            root,
            store: Box::new(store),
        })
    }

    /// Opens a cache over an alternative metadata-store engine.
    pub fn with_store(root: PathBuf, store: Box<dyn MetadataStore>) -> Self {
        Self { root, store }
    }

    /// The cache root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Looks up the entry for a source file under the given configuration.
    ///
    /// Returns `Ok(None)` on a miss. An entry recording a failed build is
    /// still returned; the driver decides whether to recompile.
    pub fn get(&self, source_path: &Path, config: &Config) -> Result<Option<Entry>, CacheError> {
        let fingerprint = fingerprint_source(source_path, &config.target, &config.user_folders)?;
        self.store.get(&fingerprint.to_string())
    }

    /// Records a finished build and copies its artifacts into the cache.
    ///
    /// On success, the owned outputs for (source, target) are collected
    /// from the source tree and mirrored under `artifacts/<fingerprint>/`,
    /// and any shared files not yet pooled are copied into `shared/`.
    /// A failed build is recorded with no outputs so later runs can see
    /// it. Shared-pool failures are warned about but never fail the store.
    pub fn store(
        &mut self,
        source_path: &Path,
        config: &Config,
        success: bool,
    ) -> Result<(), CacheError> {
        let fingerprint = fingerprint_source(source_path, &config.target, &config.user_folders)?;

        let outputs = if success {
            collect_outputs(source_path, &config.target)?
        } else {
            Vec::new()
        };

        let entry = Entry {
            fingerprint,
            source_file: source_path.to_string_lossy().into_owned(),
            target: config.target.clone(),
            compiler_version: String::new(),
            user_folders: config.user_folders.clone(),
            timestamp: Utc::now(),
            outputs: outputs.clone(),
            success,
        };

        self.store.put(&fingerprint.to_string(), &entry)?;

        let source_dir = source_path.parent().unwrap_or_else(|| Path::new("."));

        if success && !outputs.is_empty() {
            let artifact_dir = self.artifact_dir(&fingerprint.to_string());
            copy_artifacts(source_dir, &artifact_dir, &outputs)?;
        }

        if success {
            if let Err(e) = self.pool_shared_files(source_dir) {
                eprintln!("Warning: Failed to cache shared files: {e}");
            }
        }

        Ok(())
    }

    /// Copies shared files missing from the pool. Pooled files are never
    /// overwritten, so their modification times stay stable.
    fn pool_shared_files(&self, source_dir: &Path) -> Result<(), CacheError> {
        let shared = collect_shared(source_dir)?;
        if shared.is_empty() {
            return Ok(());
        }

        let shared_dir = self.root.join(SHARED_DIR);
        let missing: Vec<String> = shared
            .into_iter()
            .filter(|rel| {
                let mut pooled = shared_dir.clone();
                for component in rel.split('/') {
                    pooled.push(component);
                }
                !pooled.exists()
            })
            .collect();

        if missing.is_empty() {
            return Ok(());
        }

        copy_artifacts(source_dir, &shared_dir, &missing)
    }

    /// Restores a cached build's artifacts into `dest_dir`.
    ///
    /// Refuses entries from failed builds or with no outputs
    /// ([`CacheError::RestoreRefused`]); the caller falls back to
    /// compilation. Files already identical at the destination are left
    /// untouched. Afterwards, if the destination working directory is
    /// missing all sentinel shared files, the whole shared pool is
    /// replayed; replay failures are warned about but never fail the
    /// restore.
    pub fn restore(&self, entry: &Entry, dest_dir: &Path) -> Result<(), CacheError> {
        if !entry.success || entry.outputs.is_empty() {
            return Err(CacheError::RestoreRefused);
        }

        let artifact_dir = self.artifact_dir(&entry.fingerprint.to_string());
        restore_artifacts(&artifact_dir, dest_dir, &entry.outputs)?;

        if let Err(e) = self.replay_shared_files(dest_dir) {
            eprintln!("Warning: Failed to restore shared files: {e}");
        }

        Ok(())
    }

    /// Replays the shared pool into `dest_dir` if the sentinels say the
    /// working directory lost its shared files.
    fn replay_shared_files(&self, dest_dir: &Path) -> Result<(), CacheError> {
        let pool_work_dir = self.root.join(SHARED_DIR).join(WORK_DIR);
        if !pool_work_dir.is_dir() {
            return Ok(());
        }

        let dest_work_dir = dest_dir.join(WORK_DIR);
        if SHARED_SENTINELS
            .iter()
            .any(|name| dest_work_dir.join(name).exists())
        {
            return Ok(());
        }

        let entries = std::fs::read_dir(&pool_work_dir).map_err(|e| CacheError::Io {
            path: pool_work_dir.clone(),
            source: e,
        })?;

        let mut shared = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| CacheError::Io {
                path: pool_work_dir.clone(),
                source: e,
            })?;
            if entry.path().is_file() {
                shared.push(format!("{WORK_DIR}/{}", entry.file_name().to_string_lossy()));
            }
        }

        restore_artifacts(&self.root.join(SHARED_DIR), dest_dir, &shared)
    }

    /// Removes every entry and all per-entry artifacts.
    ///
    /// The shared pool is preserved: its files are identical across builds
    /// and remain valid for future restores.
    pub fn clear(&mut self) -> Result<(), CacheError> {
        self.store.delete_all()?;

        let artifacts = self.root.join(ARTIFACTS_DIR);
        match std::fs::remove_dir_all(&artifacts) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CacheError::Io {
                path: artifacts,
                source: e,
            }),
        }
    }

    /// Reports the entry count and total artifact disk usage.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.store.count(),
            artifact_bytes: dir_size(&self.root.join(ARTIFACTS_DIR)),
        }
    }

    fn artifact_dir(&self, fingerprint_hex: &str) -> PathBuf {
        self.root.join(ARTIFACTS_DIR).join(fingerprint_hex)
    }
}

/// Recursive size of all files under `dir`; missing directories and
/// unreadable entries count as zero.
fn dir_size(dir: &Path) -> u64 {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return 0;
    };

    let mut total = 0;
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            total += dir_size(&path);
        } else if let Ok(meta) = entry.metadata() {
            total += meta.len();
        }
    }
    total
}
