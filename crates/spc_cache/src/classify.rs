//! Artifact classification for the shared compiler working directory.
//!
//! The external compiler emits outputs for a source `<dir>/<base>.usp` into
//! two places: a `<base>.ush` header adjacent to the source, and the shared
//! `SPlsWork` working directory that also holds every other source file's
//! artifacts plus common runtime libraries. Each file in the working
//! directory falls into one of four categories: owned directly
//! (`<base>.<ext>`, produced for Series 3/4), owned with a series prefix
//! (`S<digit>_<base>.<ext>`), shared (config files and well-known runtime
//! DLLs), or foreign (another source file's output).

use std::path::Path;

use spc_common::Series;

use crate::error::CacheError;

/// Name of the working directory the external compiler emits into.
pub const WORK_DIR: &str = "SPlsWork";

/// Historical metadata file some compiler versions leave in the working
/// directory; never an artifact.
const METADATA_FILE: &str = "metadata.json";

/// Extensions that always mark a working-directory file as shared.
const SHARED_EXTENSIONS: [&str; 4] = ["ini", "xml", "dat", "der"];

/// Keywords identifying shared runtime DLLs (matched case-insensitively
/// against the file stem). Source-specific DLLs are named after the source
/// file and contain none of these.
const SHARED_DLL_KEYWORDS: [&str; 8] = [
    "Managed",
    "Simpl",
    "Sharp",
    "Splus",
    "Smart",
    "Utilities",
    "Newtonsoft",
    "Json",
];

/// Collects the output files belonging to one (source, target) pair.
///
/// Returns paths relative to the source directory, `/`-separated and
/// sorted: the adjacent `<base>.ush` if present, plus every owned file in
/// the working directory whose series prefix (if any) is selected by
/// `target`. A missing working directory is not an error; any other read
/// failure is [`CacheError::Classification`].
pub fn collect_outputs(source_path: &Path, target: &str) -> Result<Vec<String>, CacheError> {
    let base = source_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    let source_dir = source_path.parent().unwrap_or_else(|| Path::new("."));

    let mut outputs = Vec::new();

    let ush = format!("{base}.ush");
    if source_dir.join(&ush).is_file() {
        outputs.push(ush);
    }

    scan_work_dir(source_dir, |name| {
        if owned_for_target(name, base, target) {
            outputs.push(format!("{WORK_DIR}/{name}"));
        }
    })?;

    outputs.sort();
    Ok(outputs)
}

/// Collects the working-directory files classified as shared.
///
/// Returns `SPlsWork/`-prefixed paths relative to `source_dir`, sorted.
/// Same missing-directory and error behavior as [`collect_outputs`].
pub fn collect_shared(source_dir: &Path) -> Result<Vec<String>, CacheError> {
    let mut shared = Vec::new();
    scan_work_dir(source_dir, |name| {
        if is_shared(name) {
            shared.push(format!("{WORK_DIR}/{name}"));
        }
    })?;
    shared.sort();
    Ok(shared)
}

/// Iterates plain-file names in `<source_dir>/SPlsWork`, skipping
/// subdirectories and the historical metadata file.
fn scan_work_dir(source_dir: &Path, mut visit: impl FnMut(&str)) -> Result<(), CacheError> {
    let work_dir = source_dir.join(WORK_DIR);
    let entries = match std::fs::read_dir(&work_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => {
            return Err(CacheError::Classification {
                path: work_dir,
                source: e,
            })
        }
    };

    for entry in entries {
        let entry = entry.map_err(|e| CacheError::Classification {
            path: work_dir.clone(),
            source: e,
        })?;
        let file_type = entry.file_type().map_err(|e| CacheError::Classification {
            path: entry.path(),
            source: e,
        })?;
        if file_type.is_dir() {
            continue;
        }
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if name == METADATA_FILE {
            continue;
        }
        visit(name);
    }

    Ok(())
}

/// Splits a filename into stem and extension (without the dot).
fn split_name(filename: &str) -> (&str, &str) {
    match filename.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, ext),
        _ => (filename, ""),
    }
}

/// Whether a candidate stem names the given source base.
///
/// Some artifact extensions preserve spaces from the source name while
/// others convert them to underscores, so `example 3.inf` and
/// `example_3.cs` both belong to source `example 3.usp`. Both sides are
/// compared with spaces normalized to underscores; the exact name is
/// accepted as well.
fn stems_match(candidate: &str, base: &str) -> bool {
    candidate == base || candidate.replace(' ', "_") == base.replace(' ', "_")
}

/// Whether `filename` is an output owned by (`base`, `target`).
///
/// Direct matches (`<base>.<ext>`) are Series 3/4 outputs and belong only
/// when the target includes series 3 or 4. Prefixed matches
/// (`S<digit>_<base>.<ext>`) belong when the target includes that digit.
fn owned_for_target(filename: &str, base: &str, target: &str) -> bool {
    let (stem, _) = split_name(filename);

    if stems_match(stem, base) {
        return target.contains('3') || target.contains('4');
    }

    let bytes = stem.as_bytes();
    if bytes.len() > 3 && bytes[0] == b'S' && bytes[2] == b'_' {
        let digit = bytes[1] as char;
        if Series::from_digit(digit).is_some() && stems_match(&stem[3..], base) {
            return target.contains(digit);
        }
    }

    false
}

/// Whether a working-directory file is a shared library/config file.
fn is_shared(filename: &str) -> bool {
    let (stem, ext) = split_name(filename);

    if ext == "dll"
        && SHARED_DLL_KEYWORDS
            .iter()
            .any(|keyword| contains_ignore_case(stem, keyword))
    {
        return true;
    }

    SHARED_EXTENSIONS.contains(&ext)
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack
        .to_ascii_lowercase()
        .contains(&needle.to_ascii_lowercase())
}
