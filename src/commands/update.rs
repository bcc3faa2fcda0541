//! Command: run every backend's update action.
use anyhow::Result;
use std::sync::Arc;

use crate::cli::RunOpts;
use crate::exec::{Executor, SystemExecutor};
use crate::logging::Logger;
use crate::tasks;

/// Run the update command.
///
/// # Errors
///
/// Returns an error if the config cannot be loaded or any backend update fails.
pub fn run(opts: &RunOpts, log: &Arc<Logger>) -> Result<()> {
    run_with(opts, log, Arc::new(SystemExecutor))
}

/// Run the update command with a caller-supplied executor.
///
/// # Errors
///
/// Same as [`run`].
pub fn run_with(opts: &RunOpts, log: &Arc<Logger>, executor: Arc<dyn Executor>) -> Result<()> {
    let config = super::load_config(&opts.config, log)?;
    let ctx = super::context(config, opts, log, executor);
    let all_tasks = tasks::update_tasks(&ctx.config);
    super::run_tasks_to_completion(all_tasks.iter().map(AsRef::as_ref), &ctx, log)
}
