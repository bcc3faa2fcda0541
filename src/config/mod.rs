//! Configuration loading and normalization.
//!
//! A config file is YAML with four top-level keys:
//!
//! ```yaml
//! symlinks:
//!   - {from: dotfiles/vimrc, to: home/.vimrc}
//! backends:
//!   apt: backend/apt.yaml
//!   rustup: {list: rustup toolchain list, install: rustup toolchain install, update: rustup update}
//! pkgdbs: packages
//! tasks: []
//! ```
//!
//! Whatever shape was accepted on input, the engine only ever sees the
//! normalized [`Config`].
pub mod backends;
pub mod symlinks;
pub mod validation;
pub mod writer;
pub mod yaml_loader;

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use backends::{BackendEntry, BackendSpec};
use symlinks::{SymlinkSection, SymlinkSpec};

/// Package database directory used when the config does not name one.
pub const DEFAULT_PACKAGE_DIR: &str = "packages";

/// Fully resolved desired state for one run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory containing the config file; every relative path resolves against it.
    pub root: PathBuf,
    /// Symlinks in declaration order.
    pub symlinks: Vec<SymlinkSpec>,
    /// Backends in declaration order.
    pub backends: Vec<BackendSpec>,
    /// Package database directory, relative to `root`.
    pub package_dir: PathBuf,
    /// Reserved; parsed and otherwise ignored.
    pub tasks: Vec<serde_yaml::Value>,
}

/// On-disk shape before normalization.
#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(default)]
    symlinks: Option<SymlinkSection>,
    #[serde(default)]
    backends: Option<serde_yaml::Mapping>,
    #[serde(default, alias = "package_files")]
    pkgdbs: Option<PathBuf>,
    #[serde(default)]
    tasks: Option<Vec<serde_yaml::Value>>,
}

impl Config {
    /// Load and normalize the config file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file or a referenced backend file cannot be
    /// read or parsed, or if an entry cannot be normalized.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let path = absolute_path(path)?;
        let root = path
            .parent()
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        let raw: Option<RawConfig> = yaml_loader::load_yaml(&path)?;
        Self::from_raw(raw, root)
    }

    /// Parse config text as if it were a file located in `root`.
    ///
    /// # Errors
    ///
    /// Same as [`Config::load`].
    pub fn from_yaml(content: &str, root: &Path) -> Result<Self, ConfigError> {
        let raw: Option<RawConfig> = yaml_loader::parse_yaml(content, &root.join("<inline>"))?;
        Self::from_raw(raw, root.to_path_buf())
    }

    fn from_raw(raw: Option<RawConfig>, root: PathBuf) -> Result<Self, ConfigError> {
        let Some(raw) = raw else {
            return Ok(Self::empty(root));
        };

        let symlinks = match raw.symlinks {
            Some(section) => section.normalize()?,
            None => Vec::new(),
        };

        let backends = raw
            .backends
            .unwrap_or_default()
            .into_iter()
            .map(|(key, value)| {
                let name = match key {
                    serde_yaml::Value::String(name) => name,
                    other => return Err(ConfigError::InvalidBackendName(format!("{other:?}"))),
                };
                let entry = BackendEntry::from_value(&name, value, &root)?;
                backends::resolve(&name, entry, &root)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            root,
            symlinks,
            backends,
            package_dir: raw
                .pkgdbs
                .unwrap_or_else(|| PathBuf::from(DEFAULT_PACKAGE_DIR)),
            tasks: raw.tasks.unwrap_or_default(),
        })
    }

    fn empty(root: PathBuf) -> Self {
        Self {
            root,
            symlinks: Vec::new(),
            backends: Vec::new(),
            package_dir: PathBuf::from(DEFAULT_PACKAGE_DIR),
            tasks: Vec::new(),
        }
    }

    /// Absolute package database directory.
    #[must_use]
    pub fn package_dir(&self) -> PathBuf {
        self.root.join(&self.package_dir)
    }

    /// Run non-fatal checks; see [`validation::validate`].
    #[must_use]
    pub fn validate(&self) -> Vec<validation::ValidationWarning> {
        validation::validate(self)
    }
}

/// Make `path` absolute against the working directory.
///
/// Symlinks are not followed: a config file that is itself a link keeps the
/// directory it was invoked through as its root.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] if the working directory cannot be determined.
pub fn absolute_path(path: &Path) -> Result<PathBuf, ConfigError> {
    let absolute = std::path::absolute(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(dunce::simplified(&absolute).to_path_buf())
}
