//! Invocation of the external SIMPL+ compiler.
//!
//! Builds the argument list the compiler expects, runs it behind a small
//! runner trait so tests can script exit codes, and interprets the
//! compiler's exit-code vocabulary (where 116 — "finished successfully,
//! but with errors" — still counts as a successful build).

#![warn(missing_docs)]

mod codes;
mod command;
mod error;
mod runner;

pub use codes::{error_message, is_success};
pub use command::{build_command, BuildCommand};
pub use error::CompilerError;
pub use runner::{CompilerRunner, ProcessRunner, ScriptedRunner};
