//! Per-backend package database files.
//!
//! Each file is a YAML sequence of package names, sorted so that successive
//! snapshots diff cleanly:
//!
//! ```yaml
//! - git
//! - vim
//! ```
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};

use super::helpers::fs::write_atomic;

/// The durable snapshot of one backend's installed packages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageDatabase {
    path: PathBuf,
}

impl PackageDatabase {
    /// Database for backend `name` inside `dir` (`<dir>/<name>.yaml`).
    #[must_use]
    pub fn for_backend(dir: &Path, name: &str) -> Self {
        Self {
            path: dir.join(format!("{name}.yaml")),
        }
    }

    /// Location of the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the previous snapshot, or `None` if there is none.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn read(&self) -> Result<Option<BTreeSet<String>>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("reading {}", self.path.display()));
            }
        };
        let packages: Option<BTreeSet<String>> = serde_yaml::from_str(&content)
            .with_context(|| format!("parsing {}", self.path.display()))?;
        Ok(Some(packages.unwrap_or_default()))
    }

    /// Atomically replace the snapshot with `packages`.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn write(&self, packages: &BTreeSet<String>) -> Result<()> {
        let yaml = serde_yaml::to_string(packages)
            .with_context(|| format!("serializing {}", self.path.display()))?;
        write_atomic(&self.path, yaml.as_bytes())
    }
}

/// Packages that appeared and disappeared between two snapshots.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Drift {
    /// Present now, absent before.
    pub added: Vec<String>,
    /// Present before, absent now.
    pub removed: Vec<String>,
}

impl Drift {
    /// Compare `previous` with `current`.
    #[must_use]
    pub fn between(previous: &BTreeSet<String>, current: &BTreeSet<String>) -> Self {
        Self {
            added: current.difference(previous).cloned().collect(),
            removed: previous.difference(current).cloned().collect(),
        }
    }

    /// True when both snapshots hold the same packages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}
