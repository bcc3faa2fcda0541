//! Task outcome collection and the end-of-run summary.
use std::path::PathBuf;
use std::sync::Mutex;

use super::subscriber::{DRY_RUN_TARGET, STAGE_TARGET};
use super::types::{Log, TaskEntry, TaskStatus};

/// [`Log`] implementation that turns messages into [`tracing`] events and
/// keeps one [`TaskEntry`] per task for the summary.
///
/// Where the events end up is decided by the subscriber installed with
/// [`init_subscriber`](super::init_subscriber).
#[derive(Debug, Default)]
pub struct Logger {
    entries: Mutex<Vec<TaskEntry>>,
    log_file: Option<PathBuf>,
}

impl Logger {
    /// Create a logger; `log_file` is only mentioned in the summary.
    #[must_use]
    pub fn new(log_file: Option<PathBuf>) -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            log_file,
        }
    }

    /// Every recorded entry, in recording order.
    #[must_use]
    pub fn entries(&self) -> Vec<TaskEntry> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    /// One `name: reason` line per failed task, in recording order.
    #[must_use]
    pub fn failures(&self) -> Vec<String> {
        self.entries()
            .iter()
            .filter(|entry| entry.status == TaskStatus::Failed)
            .map(TaskEntry::describe)
            .collect()
    }

    /// Log one line per task, then the totals.
    pub fn print_summary(&self) {
        let entries = self.entries();
        if entries.is_empty() {
            return;
        }

        self.stage("Summary");
        for entry in &entries {
            let (glyph, colour) = entry.status.marker();
            self.info(&format!("{colour}{glyph} {}\x1b[0m", entry.describe()));
        }

        let tally = Tally::of(&entries);
        self.info(&format!(
            "{} tasks: \x1b[32m{} ok\x1b[0m, \x1b[33m{} skipped\x1b[0m, \x1b[37m{} dry-run\x1b[0m, \x1b[31m{} failed\x1b[0m",
            entries.len(),
            tally.ok,
            tally.skipped,
            tally.dry_run,
            tally.failed
        ));

        if let Some(path) = &self.log_file {
            self.info(&format!("\x1b[2mlog: {}\x1b[0m", path.display()));
        }
    }
}

/// Number of tasks per status.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Tally {
    ok: usize,
    skipped: usize,
    dry_run: usize,
    failed: usize,
}

impl Tally {
    fn of(entries: &[TaskEntry]) -> Self {
        entries.iter().fold(Self::default(), |mut tally, entry| {
            match entry.status {
                TaskStatus::Ok => tally.ok += 1,
                TaskStatus::Skipped => tally.skipped += 1,
                TaskStatus::DryRun => tally.dry_run += 1,
                TaskStatus::Failed => tally.failed += 1,
            }
            tally
        })
    }
}

impl Log for Logger {
    fn stage(&self, msg: &str) {
        tracing::info!(target: STAGE_TARGET, "{msg}");
    }

    fn info(&self, msg: &str) {
        tracing::info!("{msg}");
    }

    fn debug(&self, msg: &str) {
        tracing::debug!("{msg}");
    }

    fn warn(&self, msg: &str) {
        tracing::warn!("{msg}");
    }

    fn error(&self, msg: &str) {
        tracing::error!("{msg}");
    }

    fn dry_run(&self, msg: &str) {
        tracing::info!(target: DRY_RUN_TARGET, "{msg}");
    }

    fn record_task(&self, name: &str, status: TaskStatus, message: Option<&str>) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(TaskEntry {
                name: name.to_string(),
                status,
                message: message.map(str::to_string),
            });
        }
    }
}
