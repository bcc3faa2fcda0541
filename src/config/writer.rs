//! Appending symlink declarations to an existing config file.
//!
//! The file is rewritten from its parsed YAML value: key order survives,
//! comments and formatting do not. A file with nothing to add is left as is.
use anyhow::{Context as _, Result};
use serde_yaml::{Mapping, Value};
use std::path::Path;

use super::symlinks::SymlinkSpec;
use super::yaml_loader;
use crate::error::ConfigError;
use crate::resources::helpers::fs::write_atomic;

const SYMLINKS_KEY: &str = "symlinks";

/// Append `specs` to the `symlinks` section of the config at `path`.
///
/// Declarations the file already holds are skipped. Returns the specs that
/// were actually added. A config reached through a symlink is written at the
/// link's target, so the link survives.
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsed or written, or if the
/// new declarations cannot be merged (see [`ConfigError::CannotRecord`]).
pub fn append_symlinks(path: &Path, specs: &[SymlinkSpec]) -> Result<Vec<SymlinkSpec>> {
    let target =
        dunce::canonicalize(path).with_context(|| format!("resolve {}", path.display()))?;
    let document: Option<Value> = yaml_loader::load_yaml(&target)?;
    let (document, added) = merge(document, specs)?;
    if added.is_empty() {
        return Ok(added);
    }

    let text = serde_yaml::to_string(&document).context("serialize config")?;
    write_atomic(&target, text.as_bytes())?;
    Ok(added)
}

fn merge(
    document: Option<Value>,
    specs: &[SymlinkSpec],
) -> Result<(Value, Vec<SymlinkSpec>), ConfigError> {
    let mut root = match document {
        None | Some(Value::Null) => Mapping::new(),
        Some(Value::Mapping(mapping)) => mapping,
        Some(_) => {
            return Err(ConfigError::CannotRecord(
                "the config file is not a mapping".to_string(),
            ));
        }
    };

    let key = Value::from(SYMLINKS_KEY);
    let added = if let Some(section) = root.get_mut(&key) {
        append_to(section, specs)?
    } else {
        let mut section = Value::Null;
        let added = append_to(&mut section, specs)?;
        root.insert(key, section);
        added
    };
    Ok((Value::Mapping(root), added))
}

/// Append to either accepted shape of the `symlinks` section.
fn append_to(section: &mut Value, specs: &[SymlinkSpec]) -> Result<Vec<SymlinkSpec>, ConfigError> {
    if section.is_null() {
        *section = Value::Sequence(Vec::new());
    }

    let mut added = Vec::new();
    for spec in specs {
        let fresh = match &mut *section {
            Value::Sequence(entries) => {
                let declared = entries.iter().any(|entry| {
                    serde_yaml::from_value::<SymlinkSpec>(entry.clone())
                        .is_ok_and(|existing| existing == *spec)
                });
                if !declared {
                    let value = serde_yaml::to_value(spec)
                        .map_err(|e| ConfigError::CannotRecord(e.to_string()))?;
                    entries.push(value);
                }
                !declared
            }
            // Legacy shape: `to: from`, one source per link location.
            Value::Mapping(legacy) => {
                let to = path_value(&spec.to)?;
                let from = path_value(&spec.from)?;
                match legacy.get(&to) {
                    Some(existing) if *existing == from => false,
                    Some(existing) => {
                        return Err(ConfigError::CannotRecord(format!(
                            "{} is already declared with source {}",
                            spec.to.display(),
                            existing.as_str().unwrap_or("<non-string>")
                        )));
                    }
                    None => {
                        legacy.insert(to, from);
                        true
                    }
                }
            }
            _ => {
                return Err(ConfigError::CannotRecord(
                    "'symlinks' is neither a list nor a mapping".to_string(),
                ));
            }
        };
        if fresh {
            added.push(spec.clone());
        }
    }
    Ok(added)
}

fn path_value(path: &Path) -> Result<Value, ConfigError> {
    path.to_str().map(Value::from).ok_or_else(|| {
        ConfigError::CannotRecord(format!("path is not valid UTF-8: {}", path.display()))
    })
}
