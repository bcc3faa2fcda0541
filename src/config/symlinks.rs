//! Symlink configuration loading.
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::ConfigError;

/// A symlink to reconcile: `to` must end up referring to the same file as `from`.
///
/// Both paths are relative to the directory containing the config file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SymlinkSpec {
    /// The real file (source of truth).
    pub from: PathBuf,
    /// The link location to create or verify.
    pub to: PathBuf,
}

impl SymlinkSpec {
    /// Create a new symlink spec.
    #[must_use]
    pub fn new(from: impl Into<PathBuf>, to: impl Into<PathBuf>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// The two accepted shapes of the `symlinks` key.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(super) enum SymlinkSection {
    /// `- {from: a.txt, to: b.txt}`
    List(Vec<SymlinkSpec>),
    /// `b.txt: a.txt` (older shape, keyed by link location).
    Legacy(serde_yaml::Mapping),
}

impl SymlinkSection {
    /// Normalize either shape into an ordered list of specs.
    pub(super) fn normalize(self) -> Result<Vec<SymlinkSpec>, ConfigError> {
        match self {
            Self::List(specs) => Ok(specs),
            Self::Legacy(mapping) => mapping
                .into_iter()
                .map(|(to, from)| match (to, from) {
                    (serde_yaml::Value::String(to), serde_yaml::Value::String(from)) => {
                        Ok(SymlinkSpec::new(from, to))
                    }
                    (to, from) => Err(ConfigError::InvalidSymlink(format!(
                        "expected 'to: from' strings, got {to:?}: {from:?}"
                    ))),
                })
                .collect(),
        }
    }
}
