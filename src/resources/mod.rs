//! Idempotent resource primitives (check + apply pattern).
pub mod backend;
pub mod database;
pub mod error;
pub mod symlink;

/// Helpers shared by resource implementations.
pub mod helpers {
    pub mod fs;
}

use anyhow::Result;

/// Minimal interface for resources that can be described and applied.
pub trait Applicable {
    /// Human-readable description of this resource.
    fn description(&self) -> String;

    /// Apply the resource change.
    ///
    /// # Errors
    ///
    /// Returns an error if the resource cannot be applied due to I/O failures,
    /// permission issues, conflicts, or other system errors.
    fn apply(&self) -> Result<ResourceChange>;
}

/// State of a resource.
///
/// # Examples
///
/// ```
/// use goot::resources::ResourceState;
///
/// let missing = ResourceState::Missing;
/// let wrong = ResourceState::Incorrect { current: "regular file".into() };
///
/// assert_ne!(missing, ResourceState::Correct);
/// assert!(matches!(wrong, ResourceState::Incorrect { .. }));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceState {
    /// Resource does not exist.
    Missing,
    /// Resource exists and matches the desired state.
    Correct,
    /// Resource exists but does not match the desired state.
    Incorrect {
        /// What currently occupies the resource.
        current: String,
    },
    /// Resource cannot be applied (e.g. its source is missing).
    Invalid {
        /// Reason why the resource cannot be applied.
        reason: String,
    },
}

/// Result of applying a resource change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceChange {
    /// Resource was created.
    Applied,
    /// Resource was already correct (no change needed).
    AlreadyCorrect,
}

/// Resources that can determine their own state independently.
pub trait Resource: Applicable {
    /// Check the current state of the resource.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be determined due to I/O failures.
    fn current_state(&self) -> Result<ResourceState>;
}
