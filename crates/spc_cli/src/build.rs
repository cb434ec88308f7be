//! `spc build` — the cache-aware build driver.
//!
//! Processes source files sequentially in argument order. For each file:
//! look up a cache entry; on a hit from a successful build, restore the
//! artifacts and skip the compiler; otherwise invoke the compiler, then
//! record the result. Cache problems degrade to warnings — a broken cache
//! must never break a build.

use std::path::Path;

use spc_cache::Cache;
use spc_common::parse_target;
use spc_compiler::{build_command, error_message, is_success, CompilerRunner, ProcessRunner};
use spc_config::{Config, ConfigOverlay};

use crate::{BuildArgs, GlobalArgs};

/// Runs the `spc build` command.
///
/// Returns the process exit code: 0 on success, otherwise the external
/// compiler's exit code for the first file that failed.
pub fn run(args: &BuildArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    validate_extensions(&args.files)?;

    let flags = overlay_from_args(args, global);
    let first = std::path::absolute(&args.files[0])?;
    let config = spc_config::load(&flags, Some(&first))?;

    if config.verbose {
        print_build_info(&config, &args.files);
    }

    let mut cache = if args.no_cache {
        None
    } else {
        match Cache::new(None) {
            Ok(cache) => Some(cache),
            Err(e) => {
                eprintln!("Warning: Build cache unavailable: {e}");
                None
            }
        }
    };

    execute(&args.files, &config, cache.as_mut(), &ProcessRunner, global.quiet)
}

/// Rejects files that are not SIMPL+ sources.
fn validate_extensions(files: &[String]) -> Result<(), String> {
    for file in files {
        if !file.ends_with(".usp") && !file.ends_with(".usl") {
            return Err(format!("file {file} must have .usp or .usl extension"));
        }
    }
    Ok(())
}

/// Builds the CLI-flags overlay, setting only flags the user passed.
fn overlay_from_args(args: &BuildArgs, global: &GlobalArgs) -> ConfigOverlay {
    ConfigOverlay {
        compiler_path: None,
        target: args.target.clone(),
        usersplusfolder: (!args.user_folders.is_empty()).then(|| args.user_folders.clone()),
        out: args.out.clone(),
        silent: args.silent.then_some(true),
        verbose: global.verbose.then_some(true),
    }
}

fn print_build_info(config: &Config, files: &[String]) {
    let series: Vec<_> = parse_target(&config.target)
        .iter()
        .map(|s| s.as_arg())
        .collect();
    eprintln!("  Compiler {}", config.compiler_path);
    eprintln!("    Target {} ({})", config.target, series.join(", "));
    eprintln!("     Files {}", files.join(", "));
    if let Some(out) = &config.output_file {
        eprintln!("       Out {out}");
    }
    if !config.user_folders.is_empty() {
        eprintln!("   Folders {}", config.user_folders.join(", "));
    }
}

/// Drives the per-file compile-or-restore loop.
///
/// Split from [`run`] so tests can substitute the cache root and a
/// scripted compiler runner.
pub(crate) fn execute(
    files: &[String],
    config: &Config,
    mut cache: Option<&mut Cache>,
    runner: &dyn CompilerRunner,
    quiet: bool,
) -> Result<i32, Box<dyn std::error::Error>> {
    for file in files {
        let source = std::path::absolute(file)?;
        let source_dir = source.parent().unwrap_or_else(|| Path::new("."));

        if let Some(cache) = cache.as_deref_mut() {
            if try_restore(cache, &source, source_dir, config) {
                if !quiet {
                    eprintln!("    Cached {file}");
                }
                continue;
            }
        }

        let command = build_command(config, std::slice::from_ref(file))?;
        if config.verbose {
            eprintln!("   Running {}", command.command_line());
        }

        let code = runner.run(&command)?;
        let success = is_success(code);

        if let Some(cache) = cache.as_deref_mut() {
            if let Err(e) = cache.store(&source, config, success) {
                eprintln!("Warning: Failed to update build cache: {e}");
            }
        }

        if !success {
            eprintln!("Compilation failed (exit code {code}): {}", error_message(code));
            return Ok(code);
        }

        if !quiet {
            eprintln!("  Compiled {file}");
        }
    }

    Ok(0)
}

/// Attempts a cache-hit restore; returns `true` if the compiler can be
/// skipped.
///
/// A lookup failure is downgraded to a warning and treated as a miss, as
/// is an entry that fails to restore. Entries recording failed builds are
/// not restored — the file is recompiled.
fn try_restore(cache: &mut Cache, source: &Path, source_dir: &Path, config: &Config) -> bool {
    let entry = match cache.get(source, config) {
        Ok(Some(entry)) => entry,
        Ok(None) => return false,
        Err(e) => {
            eprintln!("Warning: Cache lookup failed: {e}");
            return false;
        }
    };

    if !entry.success || entry.outputs.is_empty() {
        return false;
    }

    match cache.restore(&entry, source_dir) {
        Ok(()) => true,
        Err(e) => {
            eprintln!("Warning: Failed to restore cached build: {e}");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spc_cache::WORK_DIR;
    use spc_compiler::ScriptedRunner;
    use std::path::PathBuf;

    fn make_config(target: &str) -> Config {
        Config {
            target: target.to_string(),
            ..Config::default()
        }
    }

    /// A project with one compiled-looking source file.
    fn make_project(source: &str, work_files: &[&str]) -> (tempfile::TempDir, String) {
        let dir = tempfile::tempdir().unwrap();
        let source_path = dir.path().join(source);
        std::fs::write(&source_path, format!("source of {source}")).unwrap();
        let work = dir.path().join(WORK_DIR);
        std::fs::create_dir(&work).unwrap();
        for name in work_files {
            std::fs::write(work.join(name), format!("artifact {name}")).unwrap();
        }
        (dir, source_path.to_string_lossy().into_owned())
    }

    fn make_cache() -> (tempfile::TempDir, Cache) {
        let dir = tempfile::tempdir().unwrap();
        let cache = Cache::new(Some(&dir.path().join(".spc-cache"))).unwrap();
        (dir, cache)
    }

    #[test]
    fn extensions_validated() {
        assert!(validate_extensions(&["app.usp".to_string()]).is_ok());
        assert!(validate_extensions(&["lib.usl".to_string()]).is_ok());
        assert!(validate_extensions(&["app.c".to_string()]).is_err());
        assert!(validate_extensions(&["app.usp".to_string(), "x.txt".to_string()]).is_err());
    }

    #[test]
    fn overlay_sets_only_passed_flags() {
        let args = BuildArgs {
            files: vec!["app.usp".to_string()],
            target: Some("34".to_string()),
            user_folders: vec![],
            out: None,
            silent: false,
            no_cache: false,
        };
        let global = GlobalArgs {
            quiet: false,
            verbose: false,
        };
        let overlay = overlay_from_args(&args, &global);
        assert_eq!(overlay.target.as_deref(), Some("34"));
        assert!(overlay.usersplusfolder.is_none());
        assert!(overlay.silent.is_none());
        assert!(overlay.verbose.is_none());
    }

    #[test]
    fn compile_then_hit_skips_compiler() {
        let (_proj, source) = make_project("app.usp", &["app.dll", "app.cs"]);
        let (_cache_dir, mut cache) = make_cache();
        let config = make_config("34");
        let runner = ScriptedRunner::new(0);
        let files = vec![source];

        let code = execute(&files, &config, Some(&mut cache), &runner, true).unwrap();
        assert_eq!(code, 0);
        assert_eq!(runner.invocations().len(), 1);
        assert_eq!(cache.stats().entries, 1);

        // Second build of identical input: restored, not recompiled.
        let code = execute(&files, &config, Some(&mut cache), &runner, true).unwrap();
        assert_eq!(code, 0);
        assert_eq!(runner.invocations().len(), 1);
    }

    #[test]
    fn hit_restores_deleted_outputs() {
        let (proj, source) = make_project("app.usp", &["app.dll"]);
        let (_cache_dir, mut cache) = make_cache();
        let config = make_config("34");
        let runner = ScriptedRunner::new(0);
        let files = vec![source];

        execute(&files, &config, Some(&mut cache), &runner, true).unwrap();
        std::fs::remove_dir_all(proj.path().join(WORK_DIR)).unwrap();

        execute(&files, &config, Some(&mut cache), &runner, true).unwrap();
        assert_eq!(runner.invocations().len(), 1);
        assert!(proj.path().join(WORK_DIR).join("app.dll").is_file());
    }

    #[test]
    fn warnings_exit_code_counts_as_success() {
        let (_proj, source) = make_project("app.usp", &["app.dll"]);
        let (_cache_dir, mut cache) = make_cache();
        let config = make_config("34");
        let runner = ScriptedRunner::new(116);
        let files = vec![source.clone()];

        let code = execute(&files, &config, Some(&mut cache), &runner, true).unwrap();
        assert_eq!(code, 0);

        let entry = cache
            .get(Path::new(&source), &config)
            .unwrap()
            .expect("entry stored");
        assert!(entry.success);
    }

    #[test]
    fn failure_returns_code_and_is_recorded() {
        let (_proj, source) = make_project("app.usp", &["app.dll"]);
        let (_cache_dir, mut cache) = make_cache();
        let config = make_config("34");
        let runner = ScriptedRunner::new(106);
        let files = vec![source.clone()];

        let code = execute(&files, &config, Some(&mut cache), &runner, true).unwrap();
        assert_eq!(code, 106);

        let entry = cache
            .get(Path::new(&source), &config)
            .unwrap()
            .expect("failed build recorded");
        assert!(!entry.success);
        assert!(entry.outputs.is_empty());
    }

    #[test]
    fn failed_entry_does_not_skip_recompilation() {
        let (_proj, source) = make_project("app.usp", &["app.dll"]);
        let (_cache_dir, mut cache) = make_cache();
        let config = make_config("34");
        let files = vec![source];

        let failing = ScriptedRunner::new(106);
        execute(&files, &config, Some(&mut cache), &failing, true).unwrap();

        // Same input again, compiler fixed: the failed entry is ignored and
        // the file recompiles.
        let passing = ScriptedRunner::new(0);
        let code = execute(&files, &config, Some(&mut cache), &passing, true).unwrap();
        assert_eq!(code, 0);
        assert_eq!(passing.invocations().len(), 1);
    }

    #[test]
    fn stops_at_first_failing_file() {
        let (_proj_a, source_a) = make_project("a.usp", &["a.dll"]);
        let (_proj_b, source_b) = make_project("b.usp", &["b.dll"]);
        let config = make_config("34");
        let runner = ScriptedRunner::new(107);
        let files = vec![source_a, source_b];

        let code = execute(&files, &config, None, &runner, true).unwrap();
        assert_eq!(code, 107);
        assert_eq!(runner.invocations().len(), 1);
    }

    #[test]
    fn no_cache_always_invokes_compiler() {
        let (_proj, source) = make_project("app.usp", &["app.dll"]);
        let config = make_config("34");
        let runner = ScriptedRunner::new(0);
        let files = vec![source];

        execute(&files, &config, None, &runner, true).unwrap();
        execute(&files, &config, None, &runner, true).unwrap();
        assert_eq!(runner.invocations().len(), 2);
    }

    #[test]
    fn source_change_invalidates_hit() {
        let (proj, source) = make_project("app.usp", &["app.dll"]);
        let (_cache_dir, mut cache) = make_cache();
        let config = make_config("34");
        let runner = ScriptedRunner::new(0);
        let files = vec![source];

        execute(&files, &config, Some(&mut cache), &runner, true).unwrap();
        std::fs::write(proj.path().join("app.usp"), "edited source").unwrap();
        execute(&files, &config, Some(&mut cache), &runner, true).unwrap();

        assert_eq!(runner.invocations().len(), 2);
        assert_eq!(cache.stats().entries, 2);
    }

    #[test]
    fn per_file_command_targets_single_source() {
        let (_proj_a, source_a) = make_project("a.usp", &["a.dll"]);
        let (_proj_b, source_b) = make_project("b.usp", &["b.dll"]);
        let config = make_config("34");
        let runner = ScriptedRunner::new(0);
        let files = vec![source_a.clone(), source_b.clone()];

        execute(&files, &config, None, &runner, true).unwrap();

        let invocations = runner.invocations();
        assert_eq!(invocations.len(), 2);
        let expected_a = PathBuf::from(&source_a);
        assert!(invocations[0]
            .args
            .iter()
            .any(|arg| Path::new(arg) == expected_a));
        assert!(!invocations[0].args.contains(&source_b));
    }
}
