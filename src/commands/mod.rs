//! Top-level subcommand orchestration.
pub mod add;
pub mod dump;
pub mod ensure;
pub mod update;
pub mod version;

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

use crate::cli::RunOpts;
use crate::config::Config;
use crate::error::TaskError;
use crate::exec::Executor;
use crate::logging::{Log, Logger};
use crate::tasks::{self, Context, Task};

/// Load and validate the config, logging what was found.
///
/// # Errors
///
/// Returns an error if the config cannot be loaded.
pub fn load_config(path: &Path, log: &Logger) -> Result<Config> {
    log.stage("Loading configuration");
    let config = Config::load(path)?;

    log.debug(&format!("root: {}", config.root.display()));
    log.debug(&format!("package databases: {}", config.package_dir().display()));
    log.info(&format!(
        "loaded {} backends, {} symlinks",
        config.backends.len(),
        config.symlinks.len()
    ));

    let warnings = config.validate();
    if !warnings.is_empty() {
        log.warn(&format!(
            "found {} configuration warning(s):",
            warnings.len()
        ));
        for warning in &warnings {
            log.warn(&format!(
                "  {} [{}]: {}",
                warning.source, warning.item, warning.message
            ));
        }
    }

    Ok(config)
}

/// Build the task context for `opts`.
fn context(config: Config, opts: &RunOpts, log: &Arc<Logger>, executor: Arc<dyn Executor>) -> Context {
    if opts.dry_run {
        log.dry_run("no changes will be made");
    }
    Context::new(
        Arc::new(config),
        Arc::clone(log) as Arc<dyn Log>,
        opts.dry_run,
        executor,
    )
}

/// Execute every task in order, print the summary, and fail if any task failed.
///
/// A failing task never stops the ones after it.
///
/// # Errors
///
/// Returns [`TaskError::Failed`] listing every failure.
pub fn run_tasks_to_completion<'a>(
    tasks: impl IntoIterator<Item = &'a dyn Task>,
    ctx: &Context,
    log: &Logger,
) -> Result<()> {
    for task in tasks {
        tasks::execute(task, ctx);
    }

    log.print_summary();

    let failures = log.failures();
    if failures.is_empty() {
        return Ok(());
    }
    Err(TaskError::Failed {
        count: failures.len(),
        failures,
    }
    .into())
}
