//! Backend synchronization and update tasks.
use anyhow::{Context as _, Result};
use std::collections::BTreeSet;

use super::{Context, Task, TaskResult};
use crate::config::backends::{Action, BackendSpec};
use crate::resources::backend::{Backend, missing_packages};
use crate::resources::database::{Drift, PackageDatabase};

/// Synchronize one backend: bootstrap on first use, list, install declared
/// packages that are missing, and persist the listed set.
///
/// The previous database is only compared against, never trusted.
#[derive(Debug)]
pub struct SyncBackend {
    name: String,
    spec: BackendSpec,
}

impl SyncBackend {
    /// Create the task for `spec`.
    #[must_use]
    pub fn new(spec: BackendSpec) -> Self {
        Self {
            name: format!("sync {}", spec.name),
            spec,
        }
    }
}

impl Task for SyncBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let root = ctx.root();
        let backend = Backend::new(&self.spec, &root, ctx.executor.as_ref());
        let db = PackageDatabase::for_backend(&ctx.package_dir(), backend.name());
        let previous = db.read()?;

        if previous.is_none() && backend.supports(Action::Bootstrap) {
            if ctx.dry_run {
                ctx.log
                    .dry_run(&format!("would bootstrap {}", backend.name()));
            } else {
                ctx.log.info(&format!("bootstrapping {}", backend.name()));
                backend.bootstrap()?;
            }
        }

        let mut installed = backend.list()?;
        ctx.log.info(&format!(
            "{}: {} package(s) installed",
            backend.name(),
            installed.len()
        ));

        if let Some(previous) = &previous {
            report_drift(ctx, previous, &installed);
        }

        let missing = missing_packages(&self.spec.packages, &installed);
        if !missing.is_empty() {
            if ctx.dry_run {
                ctx.log
                    .dry_run(&format!("would install {}", missing.join(" ")));
            } else {
                ctx.log.info(&format!("installing {}", missing.join(" ")));
                backend.install(&missing)?;
                installed = backend.list()?;
                let still_missing = missing_packages(&self.spec.packages, &installed);
                if !still_missing.is_empty() {
                    ctx.log.warn(&format!(
                        "{}: still not listed after install: {}",
                        backend.name(),
                        still_missing.join(" ")
                    ));
                }
            }
        }

        if ctx.dry_run {
            ctx.log
                .dry_run(&format!("would write {}", db.path().display()));
            return Ok(TaskResult::DryRun);
        }

        db.write(&installed)
            .with_context(|| format!("saving package database for {}", backend.name()))?;
        ctx.log.debug(&format!("wrote {}", db.path().display()));
        Ok(TaskResult::Ok)
    }
}

/// Log what changed between the recorded and the listed package sets.
fn report_drift(ctx: &Context, previous: &BTreeSet<String>, installed: &BTreeSet<String>) {
    let drift = Drift::between(previous, installed);
    if drift.is_empty() {
        ctx.log.debug("no changes since last run");
        return;
    }
    if !drift.added.is_empty() {
        ctx.log
            .info(&format!("added since last run: {}", drift.added.join(", ")));
    }
    if !drift.removed.is_empty() {
        ctx.log.info(&format!(
            "removed since last run: {}",
            drift.removed.join(", ")
        ));
    }
}

/// Record one backend's listed packages in its database, changing nothing
/// on the system: no bootstrap, no install.
#[derive(Debug)]
pub struct SnapshotBackend {
    name: String,
    spec: BackendSpec,
}

impl SnapshotBackend {
    /// Create the task for `spec`.
    #[must_use]
    pub fn new(spec: BackendSpec) -> Self {
        Self {
            name: format!("snapshot {}", spec.name),
            spec,
        }
    }
}

impl Task for SnapshotBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let root = ctx.root();
        let backend = Backend::new(&self.spec, &root, ctx.executor.as_ref());
        let db = PackageDatabase::for_backend(&ctx.package_dir(), backend.name());

        let installed = backend.list()?;
        ctx.log.info(&format!(
            "{}: {} package(s) installed",
            backend.name(),
            installed.len()
        ));
        if let Some(previous) = db.read()? {
            report_drift(ctx, &previous, &installed);
        }

        if ctx.dry_run {
            ctx.log
                .dry_run(&format!("would write {}", db.path().display()));
            return Ok(TaskResult::DryRun);
        }
        db.write(&installed)
            .with_context(|| format!("saving package database for {}", backend.name()))?;
        ctx.log.info(&format!("wrote {}", db.path().display()));
        Ok(TaskResult::Ok)
    }
}

/// Run one backend's `update` action.
#[derive(Debug)]
pub struct UpdateBackend {
    name: String,
    spec: BackendSpec,
}

impl UpdateBackend {
    /// Create the task for `spec`.
    #[must_use]
    pub fn new(spec: BackendSpec) -> Self {
        Self {
            name: format!("update {}", spec.name),
            spec,
        }
    }
}

impl Task for UpdateBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let root = ctx.root();
        let backend = Backend::new(&self.spec, &root, ctx.executor.as_ref());

        if !backend.supports(Action::Update) {
            return Ok(TaskResult::Skipped("no update command".to_string()));
        }
        if ctx.dry_run {
            ctx.log.dry_run(&format!("would update {}", backend.name()));
            return Ok(TaskResult::DryRun);
        }

        backend.update()?;
        ctx.log.info(&format!("updated {}", backend.name()));
        Ok(TaskResult::Ok)
    }
}
