//! Per-task records and the [`Log`] interface tasks report through.
use std::fmt;

/// How one unit of work ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    /// Converged, or already converged.
    Ok,
    /// Nothing the task could do (e.g. a backend without `update`).
    Skipped,
    /// Changes were reported instead of made.
    DryRun,
    /// The task returned an error.
    Failed,
}

impl TaskStatus {
    /// Summary glyph and its ANSI colour.
    pub(super) const fn marker(self) -> (&'static str, &'static str) {
        match self {
            Self::Ok => ("✓", "\x1b[32m"),
            Self::Skipped => ("○", "\x1b[33m"),
            Self::DryRun => ("~", "\x1b[37m"),
            Self::Failed => ("✗", "\x1b[31m"),
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Ok => "ok",
            Self::Skipped => "skipped",
            Self::DryRun => "dry-run",
            Self::Failed => "failed",
        })
    }
}

/// The recorded outcome of one task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskEntry {
    /// Task name, e.g. `link .vimrc` or `sync apt`.
    pub name: String,
    /// How it ended.
    pub status: TaskStatus,
    /// Skip reason or error chain.
    pub message: Option<String>,
}

impl TaskEntry {
    /// `name: message`, or the bare name when there is no message.
    #[must_use]
    pub fn describe(&self) -> String {
        self.message
            .as_deref()
            .map_or_else(|| self.name.clone(), |msg| format!("{}: {msg}", self.name))
    }
}

/// Sink for task output and outcomes.
///
/// Tasks only see this trait, so unit tests can run them without a global
/// subscriber.
pub trait Log: Send + Sync {
    /// Section header, one per task.
    fn stage(&self, msg: &str);
    /// Progress a user wants to see.
    fn info(&self, msg: &str);
    /// Detail shown with `-v` and always kept in the log file.
    fn debug(&self, msg: &str);
    /// Something suspicious that does not fail the task.
    fn warn(&self, msg: &str);
    /// A task failure.
    fn error(&self, msg: &str);
    /// A change that dry-run mode held back.
    fn dry_run(&self, msg: &str);
    /// Record how a task ended.
    fn record_task(&self, name: &str, status: TaskStatus, message: Option<&str>);
}
