//! Independent units of reconciliation work and their execution.
//!
//! Every declared backend and every declared symlink becomes one [`Task`];
//! `add` and `dump` contribute their own.
//! Tasks never share mutable state, so one task failing has no effect on
//! the others; [`execute`] records each outcome for the run summary.
mod context;
pub mod packages;
pub mod symlinks;

pub use context::Context;

use anyhow::Result;

use crate::config::Config;
use crate::logging::TaskStatus;

/// Result of a single task execution.
///
/// # Examples
///
/// ```
/// use goot::tasks::TaskResult;
///
/// let skipped = TaskResult::Skipped("no update command".into());
/// assert!(matches!(skipped, TaskResult::Skipped(_)));
/// ```
#[derive(Debug, Clone)]
pub enum TaskResult {
    /// Task completed successfully.
    Ok,
    /// Task had nothing it could do.
    Skipped(String),
    /// Task ran in dry-run mode.
    DryRun,
}

/// A named, executable task.
pub trait Task: Send + Sync {
    /// Human-readable task name.
    fn name(&self) -> &str;

    /// Execute the task.
    ///
    /// # Errors
    ///
    /// Returns an error if the task cannot converge its resource.
    fn run(&self, ctx: &Context) -> Result<TaskResult>;
}

/// Tasks run by `ensure`: every backend in declared order, then every symlink.
#[must_use]
pub fn ensure_tasks(config: &Config) -> Vec<Box<dyn Task>> {
    let backends = config
        .backends
        .iter()
        .map(|spec| Box::new(packages::SyncBackend::new(spec.clone())) as Box<dyn Task>);
    let symlinks = config
        .symlinks
        .iter()
        .map(|spec| Box::new(symlinks::EnsureSymlink::new(spec.clone())) as Box<dyn Task>);
    backends.chain(symlinks).collect()
}

/// Tasks run by `update`: every backend in declared order.
#[must_use]
pub fn update_tasks(config: &Config) -> Vec<Box<dyn Task>> {
    config
        .backends
        .iter()
        .map(|spec| Box::new(packages::UpdateBackend::new(spec.clone())) as Box<dyn Task>)
        .collect()
}

/// Tasks run by `dump`: a snapshot of every backend, then the symlink scan.
#[must_use]
pub fn dump_tasks(config: &Config, scan: symlinks::DumpSymlinks) -> Vec<Box<dyn Task>> {
    config
        .backends
        .iter()
        .map(|spec| Box::new(packages::SnapshotBackend::new(spec.clone())) as Box<dyn Task>)
        .chain(std::iter::once(Box::new(scan) as Box<dyn Task>))
        .collect()
}

/// Execute a task, recording the result in the logger.
pub fn execute(task: &dyn Task, ctx: &Context) {
    ctx.log.stage(task.name());

    match task.run(ctx) {
        Ok(TaskResult::Ok) => {
            ctx.log.record_task(task.name(), TaskStatus::Ok, None);
        }
        Ok(TaskResult::Skipped(reason)) => {
            ctx.log.info(&format!("skipped: {reason}"));
            ctx.log
                .record_task(task.name(), TaskStatus::Skipped, Some(&reason));
        }
        Ok(TaskResult::DryRun) => {
            ctx.log.record_task(task.name(), TaskStatus::DryRun, None);
        }
        Err(e) => {
            ctx.log.error(&format!("{}: {e:#}", task.name()));
            ctx.log
                .record_task(task.name(), TaskStatus::Failed, Some(&format!("{e:#}")));
        }
    }
}


#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::config::backends::BackendSpec;
    use crate::config::symlinks::SymlinkSpec;
    use crate::config::test_helpers::empty_config;
    use std::path::PathBuf;
    use test_helpers::make_context;

    /// A mock task for testing `execute()`.
    struct MockTask {
        name: &'static str,
        result: Result<TaskResult, String>,
    }

    impl Task for MockTask {
        fn name(&self) -> &str {
            self.name
        }
        fn run(&self, _ctx: &Context) -> Result<TaskResult> {
            self.result.clone().map_err(|s| anyhow::anyhow!("{s}"))
        }
    }

    #[test]
    fn execute_records_each_outcome() {
        let (ctx, log) = make_context(PathBuf::from("/tmp"));
        let tasks = [
            MockTask {
                name: "ok",
                result: Ok(TaskResult::Ok),
            },
            MockTask {
                name: "skip",
                result: Ok(TaskResult::Skipped("nothing to do".to_string())),
            },
            MockTask {
                name: "dry",
                result: Ok(TaskResult::DryRun),
            },
            MockTask {
                name: "bad",
                result: Err("boom".to_string()),
            },
        ];
        for task in &tasks {
            execute(task, &ctx);
        }

        let statuses: Vec<TaskStatus> = log.entries().iter().map(|t| t.status).collect();
        assert_eq!(
            statuses,
            [
                TaskStatus::Ok,
                TaskStatus::Skipped,
                TaskStatus::DryRun,
                TaskStatus::Failed
            ]
        );
        assert_eq!(log.failures(), ["bad: boom"]);
    }

    #[test]
    fn ensure_tasks_put_backends_before_symlinks() {
        let mut config = empty_config(PathBuf::from("/cfg"));
        config.symlinks.push(SymlinkSpec::new("a.txt", "b.txt"));
        config.backends.push(BackendSpec {
            name: "zypper".to_string(),
            list: Some("z".to_string()),
            ..BackendSpec::default()
        });
        config.backends.push(BackendSpec {
            name: "apt".to_string(),
            list: Some("a".to_string()),
            ..BackendSpec::default()
        });

        let names: Vec<String> = ensure_tasks(&config)
            .iter()
            .map(|t| t.name().to_string())
            .collect();
        assert_eq!(names, ["sync zypper", "sync apt", "link b.txt"]);
    }

    #[test]
    fn update_tasks_cover_backends_only() {
        let mut config = empty_config(PathBuf::from("/cfg"));
        config.symlinks.push(SymlinkSpec::new("a.txt", "b.txt"));
        config.backends.push(BackendSpec {
            name: "apt".to_string(),
            list: Some("a".to_string()),
            ..BackendSpec::default()
        });
        let names: Vec<String> = update_tasks(&config)
            .iter()
            .map(|t| t.name().to_string())
            .collect();
        assert_eq!(names, ["update apt"]);
    }

    #[test]
    fn dump_tasks_snapshot_backends_then_scan() {
        let mut config = empty_config(PathBuf::from("/cfg"));
        config.backends.push(BackendSpec {
            name: "apt".to_string(),
            list: Some("a".to_string()),
            ..BackendSpec::default()
        });
        let scan = symlinks::DumpSymlinks::new(
            PathBuf::from("/cfg/config.yaml"),
            vec![PathBuf::from("/home/u")],
            2,
            Vec::new(),
        );
        let names: Vec<String> = dump_tasks(&config, scan)
            .iter()
            .map(|t| t.name().to_string())
            .collect();
        assert_eq!(names, ["snapshot apt", "dump symlinks"]);
    }
}
