//! Configuration discovery and layered loading.

use std::path::{Path, PathBuf};

use crate::types::{Config, ConfigOverlay};
use crate::ConfigError;

/// Config file extensions, tried in this order within each directory.
const CONFIG_EXTS: [&str; 4] = ["yml", "yaml", "json", "toml"];

/// Loads the effective configuration for a build.
///
/// Layers, weakest first: built-in defaults, the per-user global config
/// (`<config_dir>/spc/config.<ext>`), the nearest project-local
/// `.spc.<ext>` found by walking up from `source_hint`'s directory, and
/// finally the CLI `flags` overlay. The result is validated (paths
/// absolutized, target checked).
pub fn load(flags: &ConfigOverlay, source_hint: Option<&Path>) -> Result<Config, ConfigError> {
    let global_dir = dirs::config_dir().map(|d| d.join("spc"));
    load_with_global(flags, source_hint, global_dir.as_deref())
}

/// [`load`] with an explicit global-config directory, for tests.
pub fn load_with_global(
    flags: &ConfigOverlay,
    source_hint: Option<&Path>,
    global_dir: Option<&Path>,
) -> Result<Config, ConfigError> {
    let mut config = Config::default();

    if let Some(dir) = global_dir {
        if let Some(path) = find_global_config(dir) {
            apply_overlay_file(&path, &mut config);
        }
    }

    if let Some(hint) = source_hint {
        let start = if hint.is_dir() {
            hint.to_path_buf()
        } else {
            hint.parent().map(Path::to_path_buf).unwrap_or_default()
        };
        if let Some(path) = find_local_config(&start) {
            apply_overlay_file(&path, &mut config);
        }
    }

    flags.apply(&mut config);
    config.validate()?;
    Ok(config)
}

/// Reads and applies a config file, skipping it with a warning on failure.
///
/// A stale or malformed config in some parent directory must not break the
/// build; only explicitly flagged values are fatal.
fn apply_overlay_file(path: &Path, config: &mut Config) {
    match parse_overlay_file(path) {
        Ok(overlay) => overlay.apply(config),
        Err(e) => eprintln!("Warning: Skipping config file: {e}"),
    }
}

/// Finds the global config file `config.<ext>` in the given directory.
fn find_global_config(dir: &Path) -> Option<PathBuf> {
    CONFIG_EXTS
        .iter()
        .map(|ext| dir.join(format!("config.{ext}")))
        .find(|p| p.is_file())
}

/// Finds the nearest local config file by walking up from `dir`.
///
/// Checks `.spc.yml`, `.spc.yaml`, `.spc.json`, `.spc.toml` in each
/// directory from `dir` toward the filesystem root; the first hit wins.
pub fn find_local_config(dir: &Path) -> Option<PathBuf> {
    let mut current = dir.to_path_buf();
    loop {
        for ext in CONFIG_EXTS {
            let candidate = current.join(format!(".spc.{ext}"));
            if candidate.is_file() {
                return Some(candidate);
            }
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Reads and parses a config file into a partial overlay.
fn parse_overlay_file(path: &Path) -> Result<ConfigOverlay, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    parse_overlay_str(&content, ext).map_err(|reason| ConfigError::Parse {
        path: path.to_path_buf(),
        reason,
    })
}

/// Parses overlay content in the format named by `ext`.
///
/// Useful for testing without filesystem dependencies.
pub fn parse_overlay_str(content: &str, ext: &str) -> Result<ConfigOverlay, String> {
    match ext {
        "yml" | "yaml" => serde_yaml::from_str(content).map_err(|e| e.to_string()),
        "json" => serde_json::from_str(content).map_err(|e| e.to_string()),
        "toml" => toml::from_str(content).map_err(|e| e.to_string()),
        other => Err(format!("unsupported config format: {other:?}")),
    }
}
