//! Configuration types for spc builds.

use serde::Deserialize;

use crate::ConfigError;

/// Default external compiler location on a standard Crestron install.
pub const DEFAULT_COMPILER_PATH: &str = "C:/Program Files (x86)/Crestron/Simpl/SPlusCC.exe";

/// Default target series (all of 2, 3, and 4).
pub const DEFAULT_TARGET: &str = "234";

/// The fully resolved build configuration.
///
/// Produced by [`load`](crate::load) after merging all layers and
/// validating; threaded explicitly from the loader through the driver to
/// the cache. Paths are absolute after validation.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the external SIMPL+ compiler executable.
    pub compiler_path: String,
    /// Compilation target series string (e.g. `"234"`).
    pub target: String,
    /// Auxiliary user SIMPL+ include directories.
    pub user_folders: Vec<String>,
    /// Optional output file for the compilation log (`/out`).
    pub output_file: Option<String>,
    /// Suppress console output from the external compiler (`/silent`).
    pub silent: bool,
    /// Enable verbose wrapper output.
    pub verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            compiler_path: DEFAULT_COMPILER_PATH.to_string(),
            target: DEFAULT_TARGET.to_string(),
            user_folders: Vec::new(),
            output_file: None,
            silent: false,
            verbose: false,
        }
    }
}

impl Config {
    /// Validates the configuration and resolves paths.
    ///
    /// Absolutizes the compiler path, output file, and user folders, and
    /// rejects a target string that selects no valid series.
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        if spc_common::parse_target(&self.target).is_empty() {
            return Err(ConfigError::InvalidTarget(self.target.clone()));
        }

        self.compiler_path = absolutize(&self.compiler_path)?;

        if let Some(out) = &self.output_file {
            self.output_file = Some(absolutize(out)?);
        }

        self.user_folders.retain(|f| !f.is_empty());
        for folder in &mut self.user_folders {
            *folder = absolutize(folder)?;
        }

        Ok(())
    }
}

/// Resolves a possibly relative path against the current directory.
///
/// Does not touch the filesystem: the path need not exist.
fn absolutize(path: &str) -> Result<String, ConfigError> {
    let abs = std::path::absolute(path).map_err(|e| ConfigError::InvalidPath {
        path: path.to_string(),
        reason: e.to_string(),
    })?;
    Ok(abs.to_string_lossy().into_owned())
}

/// A partial configuration overlay.
///
/// Deserialized from config files and built from CLI flags; every field is
/// optional so a layer only overrides what it sets. Key names match the
/// original on-disk format (`usersplusfolder`, `out`).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConfigOverlay {
    /// Overrides [`Config::compiler_path`].
    pub compiler_path: Option<String>,
    /// Overrides [`Config::target`].
    pub target: Option<String>,
    /// Overrides [`Config::user_folders`].
    pub usersplusfolder: Option<Vec<String>>,
    /// Overrides [`Config::output_file`].
    pub out: Option<String>,
    /// Overrides [`Config::silent`].
    pub silent: Option<bool>,
    /// Overrides [`Config::verbose`].
    pub verbose: Option<bool>,
}

impl ConfigOverlay {
    /// Applies this overlay on top of `config`, replacing only the fields
    /// that are set.
    pub fn apply(&self, config: &mut Config) {
        if let Some(v) = &self.compiler_path {
            config.compiler_path = v.clone();
        }
        if let Some(v) = &self.target {
            config.target = v.clone();
        }
        if let Some(v) = &self.usersplusfolder {
            config.user_folders = v.clone();
        }
        if let Some(v) = &self.out {
            config.output_file = Some(v.clone());
        }
        if let Some(v) = self.silent {
            config.silent = v;
        }
        if let Some(v) = self.verbose {
            config.verbose = v;
        }
    }
}
