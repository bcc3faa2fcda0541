//! Declarative environment bootstrap.
//!
//! `goot` reads a YAML config and converges two kinds of state on the local
//! machine: symlinks from declared locations to files in the config's
//! directory, and per-backend package inventories recorded in package
//! database files.
//!
//! The public API is organised into four layers:
//!
//! - **[`config`]**: load and normalize the YAML config
//! - **[`resources`]**: idempotent `check + apply` primitives (symlinks, backends, databases)
//! - **[`tasks`]**: one independent unit of work per backend or symlink
//! - **[`commands`]**: subcommand orchestration (`ensure`, `update`, `add`, `dump`, `version`)
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod exec;
pub mod logging;
pub mod resources;
pub mod tasks;
