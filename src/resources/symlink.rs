//! Symlink resource.
use anyhow::{Context as _, Result};
use std::io;
use std::path::{Path, PathBuf};

use super::error::ResourceError;
use super::{Applicable, Resource, ResourceChange, ResourceState};

/// A symlink resource that can be checked and applied.
///
/// Convergence is judged by file identity, not by link text: a `target` that
/// already resolves to the same file as `source` (through any chain of links,
/// or as a hard link) is correct and left alone.
#[derive(Debug, Clone)]
pub struct SymlinkResource {
    /// The real file (what the symlink points to).
    pub source: PathBuf,
    /// The link location.
    pub target: PathBuf,
}

impl SymlinkResource {
    /// Create a new symlink resource.
    #[must_use]
    pub const fn new(source: PathBuf, target: PathBuf) -> Self {
        Self { source, target }
    }
}

impl Applicable for SymlinkResource {
    fn description(&self) -> String {
        format!("{} -> {}", self.target.display(), self.source.display())
    }

    /// Create the link. Never replaces anything already at `target`.
    fn apply(&self) -> Result<ResourceChange> {
        if !self.source.exists() {
            return Err(ResourceError::SourceMissing {
                path: self.source.clone(),
            }
            .into());
        }

        super::helpers::fs::ensure_parent_dir(&self.target)?;

        if self.target.symlink_metadata().is_ok() {
            if same_file(&self.target, &self.source) {
                return Ok(ResourceChange::AlreadyCorrect);
            }
            return Err(ResourceError::Conflict {
                target: self.target.clone(),
                current: describe(&self.target),
            }
            .into());
        }

        create_symlink(&self.source, &self.target)?;
        Ok(ResourceChange::Applied)
    }
}

impl Resource for SymlinkResource {
    fn current_state(&self) -> Result<ResourceState> {
        if !self.source.exists() {
            return Ok(ResourceState::Invalid {
                reason: format!("source does not exist: {}", self.source.display()),
            });
        }

        match self.target.symlink_metadata() {
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(ResourceState::Missing),
            Err(e) => {
                Err(e).with_context(|| format!("reading metadata: {}", self.target.display()))
            }
            Ok(_) if same_file(&self.target, &self.source) => Ok(ResourceState::Correct),
            Ok(_) => Ok(ResourceState::Incorrect {
                current: describe(&self.target),
            }),
        }
    }
}

/// Whether `a` and `b` resolve to the same underlying file.
///
/// A dangling link resolves to nothing and is never the same file.
#[cfg(unix)]
fn same_file(a: &Path, b: &Path) -> bool {
    use std::os::unix::fs::MetadataExt as _;
    match (std::fs::metadata(a), std::fs::metadata(b)) {
        (Ok(a), Ok(b)) => a.dev() == b.dev() && a.ino() == b.ino(),
        _ => false,
    }
}

#[cfg(not(unix))]
fn same_file(a: &Path, b: &Path) -> bool {
    match (dunce::canonicalize(a), dunce::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Short description of whatever occupies `path`, for conflict messages.
fn describe(path: &Path) -> String {
    match std::fs::symlink_metadata(path) {
        Ok(meta) if meta.is_symlink() => std::fs::read_link(path).map_or_else(
            |_| "unreadable symlink".to_string(),
            |dest| format!("symlink to {}", dest.display()),
        ),
        Ok(meta) if meta.is_dir() => "directory".to_string(),
        Ok(_) => "regular file".to_string(),
        Err(e) => format!("unreadable: {e}"),
    }
}

/// Create a symlink at `link` pointing to `target`.
fn create_symlink(target: &Path, link: &Path) -> Result<()> {
    #[cfg(unix)]
    let result = std::os::unix::fs::symlink(target, link);

    #[cfg(windows)]
    let result = if target.is_dir() {
        std::os::windows::fs::symlink_dir(target, link)
    } else {
        std::os::windows::fs::symlink_file(target, link)
    };

    result.with_context(|| {
        format!(
            "creating symlink {} -> {}",
            link.display(),
            target.display()
        )
    })
}
