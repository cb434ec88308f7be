//! spc — a caching command-line wrapper for the Crestron SIMPL+ compiler.
//!
//! Provides `spc build` to compile `.usp`/`.usl` sources for one or more
//! target series with an incremental build cache, and `spc cache` to
//! inspect or clear that cache.

#![warn(missing_docs)]

mod build;
mod cache;

use std::process;

use clap::{Parser, Subcommand};

/// spc — a better way to compile Crestron SIMPL+ files.
#[derive(Parser, Debug)]
#[command(name = "spc", version, about = "A caching build wrapper for the Crestron SIMPL+ compiler")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compile SIMPL+ programs for the configured target series.
    Build(BuildArgs),
    /// Inspect or clear the build cache.
    Cache {
        /// The cache operation to run.
        #[command(subcommand)]
        command: CacheCommand,
    },
}

/// Arguments for the `spc build` subcommand.
#[derive(Parser, Debug)]
pub struct BuildArgs {
    /// Source files to compile (`.usp` or `.usl`).
    #[arg(required = true)]
    pub files: Vec<String>,

    /// Target series to compile for (e.g. 3, 34, 234).
    #[arg(short, long)]
    pub target: Option<String>,

    /// User SIMPL+ folders (repeatable).
    #[arg(short = 'u', long = "usersplusfolder")]
    pub user_folders: Vec<String>,

    /// Output file for the compilation log.
    #[arg(short, long)]
    pub out: Option<String>,

    /// Suppress console output from the SIMPL+ compiler.
    #[arg(short, long)]
    pub silent: bool,

    /// Disable the build cache.
    #[arg(long)]
    pub no_cache: bool,
}

/// Cache maintenance operations.
#[derive(Subcommand, Debug)]
pub enum CacheCommand {
    /// Show cache entry count and disk usage.
    Stats,
    /// Remove all cache entries and artifacts.
    Clear,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print verbose information.
    pub verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
    };

    let result = match cli.command {
        Command::Build(ref args) => build::run(args, &global),
        Command::Cache { ref command } => cache::run(command, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn parse_build_basic() {
        let cli = Cli::parse_from(["spc", "build", "app.usp"]);
        match cli.command {
            Command::Build(ref args) => {
                assert_eq!(args.files, vec!["app.usp"]);
                assert!(args.target.is_none());
                assert!(args.user_folders.is_empty());
                assert!(args.out.is_none());
                assert!(!args.silent);
                assert!(!args.no_cache);
            }
            _ => panic!("expected Build command"),
        }
    }

    #[test]
    fn parse_build_requires_files() {
        assert!(Cli::try_parse_from(["spc", "build"]).is_err());
    }

    #[test]
    fn parse_build_multiple_files() {
        let cli = Cli::parse_from(["spc", "build", "a.usp", "b.usl"]);
        match cli.command {
            Command::Build(ref args) => {
                assert_eq!(args.files, vec!["a.usp", "b.usl"]);
            }
            _ => panic!("expected Build command"),
        }
    }

    #[test]
    fn parse_build_with_target() {
        let cli = Cli::parse_from(["spc", "build", "-t", "34", "app.usp"]);
        match cli.command {
            Command::Build(ref args) => {
                assert_eq!(args.target.as_deref(), Some("34"));
            }
            _ => panic!("expected Build command"),
        }
    }

    #[test]
    fn parse_build_repeated_user_folders() {
        let cli = Cli::parse_from([
            "spc",
            "build",
            "-u",
            "libs/a",
            "--usersplusfolder",
            "libs/b",
            "app.usp",
        ]);
        match cli.command {
            Command::Build(ref args) => {
                assert_eq!(args.user_folders, vec!["libs/a", "libs/b"]);
            }
            _ => panic!("expected Build command"),
        }
    }

    #[test]
    fn parse_build_out_and_silent() {
        let cli = Cli::parse_from(["spc", "build", "-o", "build.log", "-s", "app.usp"]);
        match cli.command {
            Command::Build(ref args) => {
                assert_eq!(args.out.as_deref(), Some("build.log"));
                assert!(args.silent);
            }
            _ => panic!("expected Build command"),
        }
    }

    #[test]
    fn parse_build_no_cache() {
        let cli = Cli::parse_from(["spc", "build", "--no-cache", "app.usp"]);
        match cli.command {
            Command::Build(ref args) => assert!(args.no_cache),
            _ => panic!("expected Build command"),
        }
    }

    #[test]
    fn parse_global_flags() {
        let cli = Cli::parse_from(["spc", "--quiet", "build", "app.usp"]);
        assert!(cli.quiet);
        assert!(!cli.verbose);

        let cli = Cli::parse_from(["spc", "-v", "build", "app.usp"]);
        assert!(cli.verbose);
    }

    #[test]
    fn parse_cache_stats() {
        let cli = Cli::parse_from(["spc", "cache", "stats"]);
        match cli.command {
            Command::Cache { ref command } => {
                assert!(matches!(command, CacheCommand::Stats));
            }
            _ => panic!("expected Cache command"),
        }
    }

    #[test]
    fn parse_cache_clear() {
        let cli = Cli::parse_from(["spc", "cache", "clear"]);
        match cli.command {
            Command::Cache { ref command } => {
                assert!(matches!(command, CacheCommand::Clear));
            }
            _ => panic!("expected Cache command"),
        }
    }
}
