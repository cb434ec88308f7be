//! Configuration loading for the spc toolchain.
//!
//! Settings come from four layers, weakest first: built-in defaults, a
//! per-user global config file, a project-local `.spc.<ext>` file discovered
//! by walking up from the source directory, and command-line flags. Each
//! layer only overrides the keys it actually sets.

#![warn(missing_docs)]

mod error;
mod loader;
mod types;

pub use error::ConfigError;
pub use loader::{find_local_config, load, load_with_global, parse_overlay_str};
pub use types::{Config, ConfigOverlay};
