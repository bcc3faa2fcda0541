//! Domain-specific error types for the reconciliation engine.
//!
//! Internal modules return typed errors (e.g. [`ConfigError`], [`TaskError`])
//! while command handlers at the CLI boundary convert them to
//! [`anyhow::Error`] via the standard `?` operator.
//!
//! # Error hierarchy
//!
//! ```text
//! ConfigError    - YAML loading and normalization
//! ResourceError  - symlink conflicts, backend command failures
//! TaskError      - aggregate result of a reconciliation run
//! ```
//!
//! [`ResourceError`](crate::resources::error::ResourceError) lives beside the
//! resources that raise it.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that arise from loading and normalizing a configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// An I/O error occurred while reading a config file.
    #[error("IO error reading config file {path}: {source}")]
    Io {
        /// Path to the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The file is not valid YAML or does not match the expected shape.
    #[error("Invalid YAML in {file}: {message}")]
    InvalidSyntax {
        /// File that failed to parse.
        file: PathBuf,
        /// Parser message.
        message: String,
    },

    /// A legacy `to: from` symlink entry whose key or value is not a string.
    #[error("Invalid symlink entry: {0}")]
    InvalidSymlink(String),

    /// Backend names become database file names, so they must be plain names.
    #[error("Invalid backend name '{0}': must be non-empty and contain no path separators")]
    InvalidBackendName(String),

    /// New symlink declarations cannot be merged into the config file.
    #[error("Cannot record symlinks: {0}")]
    CannotRecord(String),

    /// A backend that cannot resolve an action the engine always needs.
    #[error("Backend '{backend}' declares no '{action}' command")]
    MissingAction {
        /// Backend name.
        backend: String,
        /// Action name (e.g. `list`).
        action: String,
    },
}

/// Errors that arise from running a set of tasks.
#[derive(Error, Debug)]
pub enum TaskError {
    /// One or more units of work failed; every failure is listed.
    #[error("{count} task(s) failed:\n{}", .failures.join("\n"))]
    Failed {
        /// Number of failed tasks.
        count: usize,
        /// One `name: reason` line per failed task.
        failures: Vec<String>,
    },
}
