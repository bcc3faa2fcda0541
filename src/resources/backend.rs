//! Package-manager backend resource.
//!
//! A backend is a set of shell-command templates. This module runs them and
//! turns their results into package sets or typed errors; deciding *when* to
//! run them belongs to the tasks layer.
use std::collections::BTreeSet;
use std::path::Path;

use anyhow::Result;

use super::error::ResourceError;
use crate::config::backends::{Action, BackendSpec};
use crate::exec::{ExecResult, Executor};

/// A configured backend bound to a working directory and an executor.
#[derive(Debug)]
pub struct Backend<'a> {
    spec: &'a BackendSpec,
    dir: &'a Path,
    executor: &'a dyn Executor,
}

impl<'a> Backend<'a> {
    /// Bind `spec` so its commands run in `dir` through `executor`.
    #[must_use]
    pub const fn new(spec: &'a BackendSpec, dir: &'a Path, executor: &'a dyn Executor) -> Self {
        Self {
            spec,
            dir,
            executor,
        }
    }

    /// Backend name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.spec.name
    }

    /// Whether the backend can perform `action`.
    #[must_use]
    pub fn supports(&self, action: Action) -> bool {
        self.spec.supports(action)
    }

    /// Query the currently installed packages.
    ///
    /// # Errors
    ///
    /// Returns a [`ResourceError`] if the command cannot be resolved, cannot
    /// be started, or exits non-zero.
    pub fn list(&self) -> Result<BTreeSet<String>> {
        let result = self.run(Action::List, &[])?;
        Ok(parse_package_list(&result.stdout))
    }

    /// Install `packages` with a single invocation.
    ///
    /// # Errors
    ///
    /// Same as [`Backend::list`].
    pub fn install(&self, packages: &[&str]) -> Result<()> {
        self.run(Action::Install, packages).map(drop)
    }

    /// Upgrade installed packages.
    ///
    /// # Errors
    ///
    /// Same as [`Backend::list`].
    pub fn update(&self) -> Result<()> {
        self.run(Action::Update, &[]).map(drop)
    }

    /// Prepare the package manager itself.
    ///
    /// # Errors
    ///
    /// Same as [`Backend::list`].
    pub fn bootstrap(&self) -> Result<()> {
        self.run(Action::Bootstrap, &[]).map(drop)
    }

    fn run(&self, action: Action, args: &[&str]) -> Result<ExecResult> {
        let script =
            self.spec
                .command_for(action)
                .ok_or_else(|| ResourceError::MissingAction {
                    backend: self.spec.name.clone(),
                    action: action.to_string(),
                })?;

        tracing::debug!("{} {action}: {script}", self.spec.name);

        let result = self
            .executor
            .run_shell(self.dir, &script, args)
            .map_err(|e| ResourceError::Spawn {
                backend: self.spec.name.clone(),
                action: action.to_string(),
                reason: format!("{e:#}"),
            })?;

        if !result.success {
            return Err(ResourceError::BackendFailed {
                backend: self.spec.name.clone(),
                action: action.to_string(),
                code: result.code,
                output: result.combined_output(),
            }
            .into());
        }
        Ok(result)
    }
}

/// Split `list` output into package names: one per line, trimmed, blanks dropped.
#[must_use]
pub fn parse_package_list(stdout: &str) -> BTreeSet<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Desired packages not present in `installed`, in declaration order, without duplicates.
#[must_use]
pub fn missing_packages<'d>(desired: &'d [String], installed: &BTreeSet<String>) -> Vec<&'d str> {
    let mut seen = BTreeSet::new();
    desired
        .iter()
        .map(String::as_str)
        .filter(|name| !installed.contains(*name) && seen.insert(*name))
        .collect()
}
