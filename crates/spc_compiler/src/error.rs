//! Error types for compiler invocation.

/// Errors that can occur while building or running a compiler command.
#[derive(Debug, thiserror::Error)]
pub enum CompilerError {
    /// The target string selects no valid series.
    #[error("invalid target series: {0:?}")]
    InvalidTarget(String),

    /// A source file path could not be resolved to an absolute path.
    #[error("failed to resolve absolute path for {path}: {reason}")]
    InvalidPath {
        /// The offending path.
        path: String,
        /// Description of the resolution failure.
        reason: String,
    },

    /// The compiler process could not be launched.
    #[error("failed to launch compiler {program}: {source}")]
    Launch {
        /// The compiler executable path.
        program: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The compiler process was terminated without an exit code.
    #[error("compiler terminated by signal")]
    Terminated,
}
