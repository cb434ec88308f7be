//! Compiler command-line construction.

use spc_common::parse_target;
use spc_config::Config;

use crate::error::CompilerError;

/// A fully resolved external-compiler invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildCommand {
    /// Path to the compiler executable.
    pub program: String,
    /// Arguments, in the order the compiler expects them.
    pub args: Vec<String>,
}

impl BuildCommand {
    /// The full command line as a single display string, for verbose
    /// output.
    pub fn command_line(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

/// Builds the compiler invocation for the given configuration and source
/// files.
///
/// Argument order matters to the compiler: `/target` with one series name
/// per selected series, `/usersplusfolder <dir>` per auxiliary folder,
/// `/rebuild`, the absolute source paths, then optional `/out <path>` and
/// `/silent`.
pub fn build_command(config: &Config, files: &[String]) -> Result<BuildCommand, CompilerError> {
    let series = parse_target(&config.target);
    if series.is_empty() {
        return Err(CompilerError::InvalidTarget(config.target.clone()));
    }

    let mut args = Vec::new();

    args.push("/target".to_string());
    args.extend(series.iter().map(|s| s.as_arg().to_string()));

    for folder in &config.user_folders {
        if !folder.is_empty() {
            args.push("/usersplusfolder".to_string());
            args.push(folder.clone());
        }
    }

    args.push("/rebuild".to_string());

    for file in files {
        let abs = std::path::absolute(file).map_err(|e| CompilerError::InvalidPath {
            path: file.clone(),
            reason: e.to_string(),
        })?;
        args.push(abs.to_string_lossy().into_owned());
    }

    if let Some(out) = &config.output_file {
        args.push("/out".to_string());
        args.push(out.clone());
    }

    if config.silent {
        args.push("/silent".to_string());
    }

    Ok(BuildCommand {
        program: config.compiler_path.clone(),
        args,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_config(target: &str) -> Config {
        Config {
            target: target.to_string(),
            ..Config::default()
        }
    }

    #[test]
    fn minimal_command_shape() {
        let cfg = make_config("234");
        let cmd = build_command(&cfg, &["/projects/app.usp".to_string()]).unwrap();

        assert_eq!(cmd.program, cfg.compiler_path);
        assert_eq!(
            cmd.args,
            vec![
                "/target",
                "series2",
                "series3",
                "series4",
                "/rebuild",
                "/projects/app.usp",
            ]
        );
    }

    #[test]
    fn partial_target_series() {
        let cfg = make_config("34");
        let cmd = build_command(&cfg, &["/projects/app.usp".to_string()]).unwrap();
        assert_eq!(&cmd.args[..3], &["/target", "series3", "series4"]);
    }

    #[test]
    fn user_folders_precede_rebuild() {
        let cfg = Config {
            user_folders: vec!["/libs/a".to_string(), "/libs/b".to_string()],
            ..make_config("3")
        };
        let cmd = build_command(&cfg, &["/projects/app.usp".to_string()]).unwrap();
        assert_eq!(
            cmd.args,
            vec![
                "/target",
                "series3",
                "/usersplusfolder",
                "/libs/a",
                "/usersplusfolder",
                "/libs/b",
                "/rebuild",
                "/projects/app.usp",
            ]
        );
    }

    #[test]
    fn empty_user_folders_are_skipped() {
        let cfg = Config {
            user_folders: vec![String::new()],
            ..make_config("3")
        };
        let cmd = build_command(&cfg, &["/projects/app.usp".to_string()]).unwrap();
        assert!(!cmd.args.contains(&"/usersplusfolder".to_string()));
    }

    #[test]
    fn out_and_silent_appended() {
        let cfg = Config {
            output_file: Some("/projects/build.log".to_string()),
            silent: true,
            ..make_config("3")
        };
        let cmd = build_command(&cfg, &["/projects/app.usp".to_string()]).unwrap();
        let tail = &cmd.args[cmd.args.len() - 3..];
        assert_eq!(tail, &["/out", "/projects/build.log", "/silent"]);
    }

    #[test]
    fn relative_files_are_absolutized() {
        let cfg = make_config("3");
        let cmd = build_command(&cfg, &["app.usp".to_string()]).unwrap();
        let file_arg = cmd.args.last().unwrap();
        assert!(std::path::Path::new(file_arg).is_absolute());
        assert!(file_arg.ends_with("app.usp"));
    }

    #[test]
    fn invalid_target_is_rejected() {
        let cfg = make_config("");
        let err = build_command(&cfg, &["app.usp".to_string()]).unwrap_err();
        assert!(matches!(err, CompilerError::InvalidTarget(_)));

        let cfg = make_config("5");
        assert!(build_command(&cfg, &["app.usp".to_string()]).is_err());
    }

    #[test]
    fn command_line_joins_program_and_args() {
        let cmd = BuildCommand {
            program: "SPlusCC.exe".to_string(),
            args: vec!["/target".to_string(), "series3".to_string()],
        };
        assert_eq!(cmd.command_line(), "SPlusCC.exe /target series3");
    }
}
