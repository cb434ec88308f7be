//! Error types for cache operations.

use std::path::PathBuf;

/// Errors that can occur during cache operations.
///
/// Errors on the primary artifact path (metadata and per-entry outputs)
/// are fatal to the current source file's cache operation. Errors in the
/// shared-file pool are warned about and swallowed by the cache manager.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// An I/O error occurred while reading or writing cache files.
    #[error("cache I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The compiler working directory could not be scanned.
    #[error("failed to read working directory {path}: {source}")]
    Classification {
        /// The working directory path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The metadata store could not be read or written.
    #[error("metadata store error: {reason}")]
    Metadata {
        /// Description of the failure.
        reason: String,
    },

    /// The metadata store lock could not be acquired in time.
    ///
    /// Another process holds the cache open; this design deliberately does
    /// not support concurrent writers.
    #[error("timed out waiting for cache lock {path}")]
    LockTimeout {
        /// The lock file path.
        path: PathBuf,
    },

    /// A serialization or deserialization error occurred.
    #[error("serialization error: {reason}")]
    Serialization {
        /// Description of the failure.
        reason: String,
    },

    /// Restore was requested for a failed build or one with no outputs.
    #[error("cannot restore failed build or build with no outputs")]
    RestoreRefused,
}
