//! Process execution seam.
//!
//! Backend actions are opaque shell strings, so everything goes through
//! `sh -c`. Extra arguments (package names for `install`) are passed as
//! positional parameters and forwarded with `"$@"`, never spliced into the
//! script text.
//!
//! There is no timeout: a command that never exits blocks the run.
use anyhow::{Context as _, Result};
use std::path::Path;
use std::process::{Command, Output};

/// Shell used to interpret backend command templates.
pub const SHELL: &str = "sh";

/// Result of a command execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecResult {
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
    /// Whether the process exited with status zero.
    pub success: bool,
    /// Exit code, if the process was not killed by a signal.
    pub code: Option<i32>,
}

impl ExecResult {
    /// Combined stdout and stderr, trimmed, for error reporting.
    #[must_use]
    pub fn combined_output(&self) -> String {
        let stdout = self.stdout.trim();
        let stderr = self.stderr.trim();
        match (stdout.is_empty(), stderr.is_empty()) {
            (true, _) => stderr.to_string(),
            (false, true) => stdout.to_string(),
            (false, false) => format!("{stdout}\n{stderr}"),
        }
    }
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

/// Abstraction over process execution so engines can be tested without
/// spawning real package managers.
pub trait Executor: Send + Sync + std::fmt::Debug {
    /// Run `program` with `args` in `dir` and capture its output.
    ///
    /// A non-zero exit is reported through [`ExecResult::success`], not as an
    /// error.
    ///
    /// # Errors
    ///
    /// Returns an error only if the process could not be spawned.
    fn run_in_unchecked(&self, dir: &Path, program: &str, args: &[&str]) -> Result<ExecResult>;

    /// Run a shell `script` in `dir`, exposing `args` to it as `"$@"`.
    ///
    /// # Errors
    ///
    /// Returns an error only if the shell could not be spawned.
    fn run_shell(&self, dir: &Path, script: &str, args: &[&str]) -> Result<ExecResult> {
        // Block scalars end in a newline; "$@" must stay on the last command line.
        let script = if args.is_empty() {
            script.to_string()
        } else {
            format!("{} \"$@\"", script.trim_end())
        };
        // The word after the script becomes $0.
        let mut argv = vec!["-c", script.as_str(), SHELL];
        argv.extend_from_slice(args);
        self.run_in_unchecked(dir, SHELL, &argv)
    }
}

/// Production [`Executor`] backed by [`std::process::Command`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemExecutor;

impl Executor for SystemExecutor {
    fn run_in_unchecked(&self, dir: &Path, program: &str, args: &[&str]) -> Result<ExecResult> {
        let output = Command::new(program)
            .args(args)
            .current_dir(dir)
            .output()
            .with_context(|| format!("failed to execute: {program} in {}", dir.display()))?;
        Ok(ExecResult::from(output))
    }
}
