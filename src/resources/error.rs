//! Typed error variants for resource operations.
//!
//! Resource code returns these through [`anyhow::Error`]; callers that need
//! to distinguish a conflict from a backend failure use `downcast_ref`.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that arise from resource checks and apply operations.
#[derive(Error, Debug)]
pub enum ResourceError {
    /// The link location is occupied by something other than the expected link.
    #[error("conflict at {}: {current}", .target.display())]
    Conflict {
        /// The occupied link location.
        target: PathBuf,
        /// What currently lives there.
        current: String,
    },

    /// The file a symlink should point at does not exist.
    #[error("source does not exist: {}", .path.display())]
    SourceMissing {
        /// The missing path.
        path: PathBuf,
    },

    /// A backend command exited with a non-zero status.
    #[error("backend '{backend}' {action} failed (exit {}): {output}", .code.map_or_else(|| "signal".to_string(), |c| c.to_string()))]
    BackendFailed {
        /// Backend name.
        backend: String,
        /// Action that was invoked.
        action: String,
        /// Exit code, if the process was not killed by a signal.
        code: Option<i32>,
        /// Captured stdout and stderr.
        output: String,
    },

    /// An action was invoked that the backend cannot resolve to a command.
    #[error("backend '{backend}' declares no '{action}' command")]
    MissingAction {
        /// Backend name.
        backend: String,
        /// Action name.
        action: String,
    },

    /// The shell for a backend command could not be started.
    #[error("backend '{backend}' {action} could not be started: {reason}")]
    Spawn {
        /// Backend name.
        backend: String,
        /// Action that was invoked.
        action: String,
        /// Underlying spawn error.
        reason: String,
    },
}
