//! Incremental build cache for SIMPL+ compilation.
//!
//! The external compiler emits artifacts for every source file in a
//! directory into one shared `SPlsWork` working directory, alongside common
//! runtime libraries. Rather than caching whole directories, this crate:
//!
//! 1. Filters artifacts by source base name (e.g. `example1.dll`,
//!    `S2_example1.c`) and target series, so each source file caches
//!    independently.
//! 2. Keys entries by a SHA-256 fingerprint of source content and build
//!    configuration.
//! 3. Stores entry metadata in a locked, file-backed store and artifact
//!    bytes in per-fingerprint directories, with shared libraries pooled
//!    once for the whole cache.
//! 4. Restores artifacts without touching files that are already
//!    byte-identical, preserving modification times for downstream tooling.

#![warn(missing_docs)]

mod artifact;
mod cache;
mod classify;
mod entry;
mod error;
mod fingerprint;
mod store;

pub use artifact::{copy_artifacts, restore_artifacts};
pub use cache::{Cache, CacheStats, DEFAULT_CACHE_DIR};
pub use classify::{collect_outputs, collect_shared, WORK_DIR};
pub use entry::Entry;
pub use error::CacheError;
pub use fingerprint::fingerprint_source;
pub use store::{FileStore, MetadataStore};
