//! The persistent record describing one cached build result.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use spc_common::Fingerprint;

/// A cached build result keyed by fingerprint.
///
/// Entries are immutable after creation; the cache never rewrites a stored
/// entry's fields. `outputs` paths are relative to the source file's
/// directory and always use `/` as the separator, regardless of host.
/// Unknown JSON keys are ignored on read and missing optional keys default
/// to empty, so older and newer cache files interoperate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
    /// The cache key: SHA-256 over source content, target, and user folders.
    #[serde(rename = "hash")]
    pub fingerprint: Fingerprint,

    /// Absolute path to the source file at build time (informational).
    pub source_file: String,

    /// The target series string at build time (e.g. `"234"`).
    pub target: String,

    /// Version of the external compiler used. Reserved: currently always
    /// empty, so compiler upgrades do not invalidate the cache.
    #[serde(default)]
    pub compiler_version: String,

    /// Absolute user SIMPL+ folder paths used at build time.
    #[serde(default)]
    pub user_folders: Vec<String>,

    /// UTC instant this entry was created.
    pub timestamp: DateTime<Utc>,

    /// Artifact paths belonging to this entry, relative to the source
    /// directory (e.g. `"example1.ush"`, `"SPlsWork/example1.dll"`).
    #[serde(default)]
    pub outputs: Vec<String>,

    /// Whether the build that produced these artifacts succeeded.
    pub success: bool,
}
