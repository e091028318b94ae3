//! Process execution behind a trait, so VCS delegation can be tested
//! without real clients installed.
use std::path::Path;
use std::process::{Command, Output, Stdio};

use crate::error::VcsError;

/// Result of a captured command execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecResult {
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
    /// Whether the process exited with status zero.
    pub success: bool,
    /// Exit code, `None` when killed by a signal.
    pub code: Option<i32>,
}

impl From<Output> for ExecResult {
    fn from(output: Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            success: output.status.success(),
            code: output.status.code(),
        }
    }
}

/// Runs external programs.
pub trait Executor: std::fmt::Debug {
    /// Run `program` in `dir`, capturing its output. Fails on non-zero exit.
    ///
    /// # Errors
    ///
    /// Returns [`VcsError::Spawn`] if the process cannot start and
    /// [`VcsError::CommandFailed`] if it exits non-zero.
    fn run_in(&self, dir: &Path, program: &str, args: &[&str]) -> Result<ExecResult, VcsError>;

    /// Run `program` in `dir` with the terminal attached (inherited stdio).
    ///
    /// # Errors
    ///
    /// Same as [`run_in`](Self::run_in); `stderr` in the error is empty
    /// because it went straight to the terminal.
    fn run_passthrough(&self, dir: &Path, program: &str, args: &[&str]) -> Result<(), VcsError>;

    /// Check if a program is available on PATH.
    fn which(&self, program: &str) -> bool;
}

/// [`Executor`] that spawns real processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemExecutor;

impl SystemExecutor {
    fn spawn_error(program: &str, source: std::io::Error) -> VcsError {
        if source.kind() == std::io::ErrorKind::NotFound {
            VcsError::NotFound {
                program: program.to_string(),
            }
        } else {
            VcsError::Spawn {
                program: program.to_string(),
                source,
            }
        }
    }
}

impl Executor for SystemExecutor {
    fn run_in(&self, dir: &Path, program: &str, args: &[&str]) -> Result<ExecResult, VcsError> {
        let output = Command::new(program)
            .args(args)
            .current_dir(dir)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| Self::spawn_error(program, e))?;
        let result = ExecResult::from(output);
        if !result.success {
            return Err(VcsError::CommandFailed {
                program: program.to_string(),
                args: args.join(" "),
                exit_code: result.code.unwrap_or(-1),
                stderr: result.stderr.trim().to_string(),
            });
        }
        Ok(result)
    }

    fn run_passthrough(&self, dir: &Path, program: &str, args: &[&str]) -> Result<(), VcsError> {
        let status = Command::new(program)
            .args(args)
            .current_dir(dir)
            .status()
            .map_err(|e| Self::spawn_error(program, e))?;
        if !status.success() {
            return Err(VcsError::CommandFailed {
                program: program.to_string(),
                args: args.join(" "),
                exit_code: status.code().unwrap_or(-1),
                stderr: String::new(),
            });
        }
        Ok(())
    }

    fn which(&self, program: &str) -> bool {
        which::which(program).is_ok()
    }
}


#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn run_in_captures_stdout() {
        let dir = tempfile::tempdir().unwrap();
        let result = SystemExecutor.run_in(dir.path(), "pwd", &[]).unwrap();
        assert!(result.success, "pwd should succeed");
        assert!(!result.stdout.trim().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn run_in_failure_is_command_failed() {
        let dir = tempfile::tempdir().unwrap();
        let err = SystemExecutor.run_in(dir.path(), "false", &[]).unwrap_err();
        assert!(matches!(err, VcsError::CommandFailed { exit_code: 1, .. }));
    }

    #[test]
    fn missing_program_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = SystemExecutor
            .run_in(dir.path(), "this-program-does-not-exist-12345", &[])
            .unwrap_err();
        assert!(matches!(err, VcsError::NotFound { .. }));
    }

    #[test]
    fn which_missing_program() {
        assert!(
            !SystemExecutor.which("this-program-does-not-exist-12345"),
            "non-existent program should not be found"
        );
    }

    #[test]
    fn mock_records_calls_and_replays_failures() {
        let mock = test_helpers::MockExecutor::with_responses(vec![
            (true, "ok".to_string()),
            (false, "boom".to_string()),
        ]);
        let dir = Path::new("/wc");
        assert_eq!(mock.run_in(dir, "svn", &["info"]).unwrap().stdout, "ok");
        let err = mock.run_passthrough(dir, "svn", &["status"]).unwrap_err();
        assert!(err.to_string().contains("boom"));

        let calls = mock.calls();
        assert_eq!(calls.len(), 2);
        assert!(!calls[0].passthrough);
        assert!(calls[1].passthrough);
        assert_eq!(calls[1].args, vec!["status"]);
    }
}
