//! Backend (package-manager adapter) configuration loading.
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

use super::yaml_loader;
use crate::error::ConfigError;

/// A named action a backend can perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Print installed packages, one per line.
    List,
    /// Install the packages given as arguments.
    Install,
    /// Upgrade installed packages.
    Update,
    /// Prepare the package manager itself on first use.
    Bootstrap,
}

impl Action {
    /// The action's name as used in config files and shell fallbacks.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Install => "install",
            Self::Update => "update",
            Self::Bootstrap => "bootstrap",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved backend: a capability set of shell-command templates.
///
/// Unknown keys are rejected so a misspelled action fails at load time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BackendSpec {
    /// Backend name (the key in the `backends` mapping).
    #[serde(skip)]
    pub name: String,
    /// Command printing installed packages, one per line.
    pub list: Option<String>,
    /// Command installing packages; names are appended as `"$@"`.
    pub install: Option<String>,
    /// Command upgrading installed packages.
    pub update: Option<String>,
    /// Command preparing the backend on first synchronization.
    pub bootstrap: Option<String>,
    /// Generic command; undeclared actions run as `<command> <action>`.
    pub command: Option<String>,
    /// Packages that must be installed. Empty means inventory only.
    #[serde(default)]
    pub packages: Vec<String>,
}

impl BackendSpec {
    /// Resolve the shell command for `action`, falling back to `command`.
    #[must_use]
    pub fn command_for(&self, action: Action) -> Option<String> {
        let explicit = match action {
            Action::List => &self.list,
            Action::Install => &self.install,
            Action::Update => &self.update,
            Action::Bootstrap => &self.bootstrap,
        };
        explicit.clone().or_else(|| {
            // A generic command answers everything except bootstrap, which
            // must be opted into explicitly.
            if action == Action::Bootstrap {
                return None;
            }
            self.command
                .as_ref()
                .map(|command| format!("{command} {action}"))
        })
    }

    /// Whether `action` resolves to a command.
    #[must_use]
    pub fn supports(&self, action: Action) -> bool {
        self.command_for(action).is_some()
    }
}

/// A `backends` value: either the spec inline or a path to a side file.
#[derive(Debug)]
pub(super) enum BackendEntry {
    /// `apt: backend/apt.yaml`
    File(PathBuf),
    /// `apt: {list: ..., install: ...}`
    Inline(BackendSpec),
}

impl BackendEntry {
    /// Classify the value of backend `name`: a string names a side file,
    /// anything else must be the spec itself.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidSyntax`] naming the backend and the
    /// offending field when an inline spec does not deserialize.
    pub(super) fn from_value(
        name: &str,
        value: serde_yaml::Value,
        file: &Path,
    ) -> Result<Self, ConfigError> {
        match value {
            serde_yaml::Value::String(path) => Ok(Self::File(PathBuf::from(path))),
            other => serde_yaml::from_value(other)
                .map(Self::Inline)
                .map_err(|e| ConfigError::InvalidSyntax {
                    file: file.to_path_buf(),
                    message: format!("backend '{name}': {e}"),
                }),
        }
    }
}

/// Resolve one `backends` entry into a validated [`BackendSpec`].
///
/// Side-file paths are relative to `root`.
///
/// # Errors
///
/// Returns an error if the name is not a plain file name, the side file
/// cannot be loaded, or the backend has no way to list packages.
pub(super) fn resolve(name: &str, entry: BackendEntry, root: &Path) -> Result<BackendSpec, ConfigError> {
    if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
        return Err(ConfigError::InvalidBackendName(name.to_string()));
    }

    let mut spec = match entry {
        BackendEntry::Inline(spec) => spec,
        BackendEntry::File(path) => yaml_loader::load_yaml(&root.join(path))?,
    };
    spec.name = name.to_string();

    if !spec.supports(Action::List) {
        return Err(ConfigError::MissingAction {
            backend: spec.name,
            action: Action::List.to_string(),
        });
    }
    Ok(spec)
}
