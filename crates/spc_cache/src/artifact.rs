//! Copying and restoring artifact files between filesystem trees.
//!
//! All copies skip the write when the destination already has identical
//! content. Restoring a cached build into a directory that already holds
//! the same files must not touch their modification times, because the
//! external toolchain uses mtimes to detect staleness.

use std::fs::File;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::error::CacheError;

/// Files smaller than this are compared byte-for-byte; larger files are
/// compared by SHA-256.
const DIRECT_COMPARE_LIMIT: u64 = 64 * 1024;

/// Copies each relative path from `base_dir` into `dest_dir`.
///
/// Intermediate directories are created as needed and `fs::copy` carries
/// the source file's permission bits along. Destinations that are already
/// byte-identical are left untouched. Fails on the first I/O error.
pub fn copy_artifacts(
    base_dir: &Path,
    dest_dir: &Path,
    outputs: &[String],
) -> Result<(), CacheError> {
    std::fs::create_dir_all(dest_dir).map_err(|e| CacheError::Io {
        path: dest_dir.to_path_buf(),
        source: e,
    })?;

    for output in outputs {
        let src = join_relative(base_dir, output);
        let dst = join_relative(dest_dir, output);
        copy_file_if_needed(&src, &dst)?;
    }

    Ok(())
}

/// Copies each relative path from `cache_dir` back into `dest_dir`.
///
/// The reverse of [`copy_artifacts`], with the same skip-if-identical
/// guarantee; parent directories at the destination are created as needed.
pub fn restore_artifacts(
    cache_dir: &Path,
    dest_dir: &Path,
    outputs: &[String],
) -> Result<(), CacheError> {
    for output in outputs {
        let src = join_relative(cache_dir, output);
        let dst = join_relative(dest_dir, output);
        copy_file_if_needed(&src, &dst)?;
    }

    Ok(())
}

/// Joins a `/`-separated relative path onto a host directory path.
fn join_relative(dir: &Path, relative: &str) -> PathBuf {
    let mut path = dir.to_path_buf();
    for component in relative.split('/') {
        path.push(component);
    }
    path
}

/// Copies `src` to `dst` unless the two are already identical.
///
/// Returns `true` if a copy was performed.
fn copy_file_if_needed(src: &Path, dst: &Path) -> Result<bool, CacheError> {
    if files_identical(src, dst) {
        return Ok(false);
    }

    if let Some(parent) = dst.parent() {
        std::fs::create_dir_all(parent).map_err(|e| CacheError::Io {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    std::fs::copy(src, dst).map_err(|e| CacheError::Io {
        path: src.to_path_buf(),
        source: e,
    })?;

    Ok(true)
}

/// Whether two files have the same content.
///
/// Fast size check first; empty files are trivially identical; small files
/// are compared directly and large ones by SHA-256. Any stat/read failure
/// counts as "not identical" so the copy path decides what to surface.
fn files_identical(a: &Path, b: &Path) -> bool {
    let (Ok(meta_a), Ok(meta_b)) = (std::fs::metadata(a), std::fs::metadata(b)) else {
        return false;
    };

    if meta_a.len() != meta_b.len() {
        return false;
    }
    if meta_a.len() == 0 {
        return true;
    }

    if meta_a.len() < DIRECT_COMPARE_LIMIT {
        match (std::fs::read(a), std::fs::read(b)) {
            (Ok(content_a), Ok(content_b)) => content_a == content_b,
            _ => false,
        }
    } else {
        match (hash_file(a), hash_file(b)) {
            (Ok(hash_a), Ok(hash_b)) => hash_a == hash_b,
            _ => false,
        }
    }
}

/// SHA-256 digest of a file's content.
fn hash_file(path: &Path) -> std::io::Result<[u8; 32]> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    std::io::copy(&mut file, &mut hasher)?;
    Ok(hasher.finalize().into())
}
