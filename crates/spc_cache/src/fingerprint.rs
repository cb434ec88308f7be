//! Build fingerprinting for cache keys.

use std::fs::File;
use std::path::Path;

use sha2::{Digest, Sha256};
use spc_common::Fingerprint;

use crate::error::CacheError;

/// Computes the cache fingerprint for a source file and its build inputs.
///
/// Feeds a SHA-256 digest in a fixed order: the full source file content,
/// the target string, then the `|`-joined lexicographically sorted user
/// folders. The order is part of the on-disk cache contract; changing it
/// invalidates every existing cache. Timestamps, environment, and the
/// source path itself are deliberately excluded so identical inputs
/// fingerprint identically across runs and machines.
///
/// A reserved compiler-version component is currently always empty; once
/// populated it will make compiler upgrades cache-busting.
pub fn fingerprint_source(
    source_path: &Path,
    target: &str,
    user_folders: &[String],
) -> Result<Fingerprint, CacheError> {
    let mut hasher = Sha256::new();

    let mut file = File::open(source_path).map_err(|e| CacheError::Io {
        path: source_path.to_path_buf(),
        source: e,
    })?;
    std::io::copy(&mut file, &mut hasher).map_err(|e| CacheError::Io {
        path: source_path.to_path_buf(),
        source: e,
    })?;

    hasher.update(target.as_bytes());

    let mut folders = user_folders.to_vec();
    folders.sort();
    hasher.update(folders.join("|").as_bytes());

    Ok(Fingerprint::from_digest(hasher.finalize().into()))
}
