//! Execution of compiler commands behind a swappable runner.

use std::cell::RefCell;
use std::process::Command;

use crate::command::BuildCommand;
use crate::error::CompilerError;

/// Runs a compiler command and reports its exit code.
///
/// The production implementation spawns the real process; tests substitute
/// [`ScriptedRunner`] to exercise the driver without a compiler installed.
pub trait CompilerRunner {
    /// Runs the command to completion and returns its exit code.
    fn run(&self, command: &BuildCommand) -> Result<i32, CompilerError>;
}

/// Spawns the external compiler as a child process.
///
/// The child inherits stdout/stderr so compiler output reaches the user
/// directly.
pub struct ProcessRunner;

impl CompilerRunner for ProcessRunner {
    fn run(&self, command: &BuildCommand) -> Result<i32, CompilerError> {
        let status = Command::new(&command.program)
            .args(&command.args)
            .status()
            .map_err(|e| CompilerError::Launch {
                program: command.program.clone(),
                source: e,
            })?;

        status.code().ok_or(CompilerError::Terminated)
    }
}

/// Test runner that returns a scripted exit code and records invocations.
pub struct ScriptedRunner {
    exit_code: i32,
    invocations: RefCell<Vec<BuildCommand>>,
}

impl ScriptedRunner {
    /// Creates a runner that always exits with `exit_code`.
    pub fn new(exit_code: i32) -> Self {
        Self {
            exit_code,
            invocations: RefCell::new(Vec::new()),
        }
    }

    /// The commands this runner has been asked to run, in order.
    pub fn invocations(&self) -> Vec<BuildCommand> {
        self.invocations.borrow().clone()
    }
}

impl CompilerRunner for ScriptedRunner {
    fn run(&self, command: &BuildCommand) -> Result<i32, CompilerError> {
        self.invocations.borrow_mut().push(command.clone());
        Ok(self.exit_code)
    }
}
