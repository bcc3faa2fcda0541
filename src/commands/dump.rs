//! Command: record existing symlinks and installed packages.
use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::cli::DumpOpts;
use crate::config::absolute_path;
use crate::exec::{Executor, SystemExecutor};
use crate::logging::Logger;
use crate::tasks::{self, symlinks::DumpSymlinks};

/// Run the dump command.
///
/// # Errors
///
/// Returns an error if the config cannot be loaded, no directory can be
/// scanned, or any backend or the symlink scan fails.
pub fn run(opts: &DumpOpts, log: &Arc<Logger>) -> Result<()> {
    run_with(
        opts,
        log,
        Arc::new(SystemExecutor),
        dirs::home_dir().as_deref(),
    )
}

/// Run the dump command with a caller-supplied executor and home directory.
///
/// # Errors
///
/// Same as [`run`].
pub fn run_with(
    opts: &DumpOpts,
    log: &Arc<Logger>,
    executor: Arc<dyn Executor>,
    home: Option<&Path>,
) -> Result<()> {
    let config = super::load_config(&opts.run.config, log)?;

    let dirs = if opts.dirs.is_empty() {
        let home = home.context("no --dir given and the home directory is unknown")?;
        vec![home.to_path_buf()]
    } else {
        opts.dirs
            .iter()
            .map(|dir| absolute_path(dir))
            .collect::<Result<Vec<PathBuf>, _>>()?
    };
    let scan = DumpSymlinks::new(
        absolute_path(&opts.run.config)?,
        dirs,
        opts.depth,
        opts.ignore.clone(),
    );

    let ctx = super::context(config, &opts.run, log, executor);
    let all_tasks = tasks::dump_tasks(&ctx.config, scan);
    super::run_tasks_to_completion(all_tasks.iter().map(AsRef::as_ref), &ctx, log)
}
