//! `spc cache` — build-cache inspection and maintenance.

use spc_cache::Cache;

use crate::{CacheCommand, GlobalArgs};

/// Runs an `spc cache` subcommand.
pub fn run(command: &CacheCommand, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    match command {
        CacheCommand::Stats => {
            let cache = Cache::new(None)?;
            let stats = cache.stats();
            println!("Cache entries: {}", stats.entries);
            println!("Artifact size: {}", format_size(stats.artifact_bytes));
            Ok(0)
        }
        CacheCommand::Clear => {
            let mut cache = Cache::new(None)?;
            cache.clear()?;
            if !global.quiet {
                eprintln!("   Cleared build cache");
            }
            Ok(0)
        }
    }
}

/// Formats a byte count for humans.
fn format_size(bytes: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = KIB * 1024;
    const GIB: u64 = MIB * 1024;

    if bytes >= GIB {
        format!("{:.1} GiB", bytes as f64 / GIB as f64)
    } else if bytes >= MIB {
        format!("{:.1} MiB", bytes as f64 / MIB as f64)
    } else if bytes >= KIB {
        format!("{:.1} KiB", bytes as f64 / KIB as f64)
    } else {
        format!("{bytes} B")
    }
}
