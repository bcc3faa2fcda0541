//! Command: adopt a file into the config directory.
use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

use crate::cli::AddOpts;
use crate::config::absolute_path;
use crate::exec::SystemExecutor;
use crate::logging::Logger;
use crate::tasks::Task;
use crate::tasks::symlinks::AdoptFile;

/// Run the add command against the user's home directory.
///
/// # Errors
///
/// Returns an error if the config cannot be loaded, the destination is not
/// inside the config directory, or the file cannot be moved, linked or
/// declared.
pub fn run(opts: &AddOpts, log: &Arc<Logger>) -> Result<()> {
    run_with(opts, log, dirs::home_dir().as_deref())
}

/// Run the add command with a caller-supplied home directory.
///
/// # Errors
///
/// Same as [`run`].
pub fn run_with(opts: &AddOpts, log: &Arc<Logger>, home: Option<&Path>) -> Result<()> {
    let config = super::load_config(&opts.run.config, log)?;
    let task = AdoptFile::new(
        absolute_path(&opts.run.config)?,
        &config.root,
        home,
        &opts.file,
        opts.dest.as_deref(),
    )?;
    let ctx = super::context(config, &opts.run, log, Arc::new(SystemExecutor));
    super::run_tasks_to_completion([&task as &dyn Task], &ctx, log)
}
