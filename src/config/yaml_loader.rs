//! YAML file parsing shared by the main config and backend side files.
use serde::de::DeserializeOwned;
use std::path::Path;

use crate::error::ConfigError;

/// Read and deserialize a YAML file.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] if the file cannot be read and
/// [`ConfigError::InvalidSyntax`] if it does not deserialize into `T`.
pub fn load_yaml<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_yaml(&content, path)
}

/// Deserialize YAML text, attributing errors to `file`.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidSyntax`] if `content` does not deserialize.
pub fn parse_yaml<T: DeserializeOwned>(content: &str, file: &Path) -> Result<T, ConfigError> {
    serde_yaml::from_str(content).map_err(|e| ConfigError::InvalidSyntax {
        file: file.to_path_buf(),
        message: e.to_string(),
    })
}
