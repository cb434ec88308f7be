//! Error types for configuration loading and validation.

use std::path::PathBuf;

/// Errors that can occur when loading or validating spc configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An I/O error occurred while reading a configuration file.
    #[error("failed to read configuration {path}: {source}")]
    Io {
        /// The configuration file path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A configuration file could not be parsed.
    #[error("failed to parse configuration {path}: {reason}")]
    Parse {
        /// The configuration file path.
        path: PathBuf,
        /// Description of the parse failure.
        reason: String,
    },

    /// The target string selects no valid series.
    #[error("invalid target series: {0:?}")]
    InvalidTarget(String),

    /// A configured path could not be resolved to an absolute path.
    #[error("invalid path {path}: {reason}")]
    InvalidPath {
        /// The offending path value.
        path: String,
        /// Description of the resolution failure.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_invalid_target() {
        let err = ConfigError::InvalidTarget("56".to_string());
        assert_eq!(format!("{err}"), "invalid target series: \"56\"");
    }

    #[test]
    fn display_parse() {
        let err = ConfigError::Parse {
            path: PathBuf::from(".spc.toml"),
            reason: "expected '=' at line 3".to_string(),
        };
        let msg = format!("{err}");
        assert!(msg.contains(".spc.toml"));
        assert!(msg.contains("line 3"));
    }

    #[test]
    fn display_io() {
        let err = ConfigError::Io {
            path: PathBuf::from("config.yml"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        assert!(format!("{err}").starts_with("failed to read configuration"));
    }
}
