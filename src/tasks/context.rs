use std::path::PathBuf;
use std::sync::Arc;

use crate::config::Config;
use crate::exec::Executor;
use crate::logging::Log;

/// Shared context for task execution.
///
/// Built once per invocation from the loaded config and the run mode, then
/// handed to every task.
pub struct Context {
    /// Configuration for this run; read-only.
    pub config: Arc<Config>,
    /// Logger for output and task recording.
    pub log: Arc<dyn Log>,
    /// Whether to perform a dry run (preview changes without applying).
    pub dry_run: bool,
    /// Command executor (for testing or real system calls).
    pub executor: Arc<dyn Executor>,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("config", &"<Config>")
            .field("log", &"<dyn Log>")
            .field("dry_run", &self.dry_run)
            .field("executor", &self.executor)
            .finish()
    }
}

impl Context {
    /// Creates a new context for task execution.
    #[must_use]
    pub fn new(
        config: Arc<Config>,
        log: Arc<dyn Log>,
        dry_run: bool,
        executor: Arc<dyn Executor>,
    ) -> Self {
        Self {
            config,
            log,
            dry_run,
            executor,
        }
    }

    /// Directory every relative config path resolves against.
    #[must_use]
    pub fn root(&self) -> PathBuf {
        self.config.root.clone()
    }

    /// Absolute package database directory.
    #[must_use]
    pub fn package_dir(&self) -> PathBuf {
        self.config.package_dir()
    }
}
