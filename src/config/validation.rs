//! Non-fatal configuration checks.
//!
//! Loading already rejects configurations the engine cannot act on. The
//! checks here flag entries that will fail or do nothing at run time so they
//! are visible before any reconciliation starts.
use std::collections::HashSet;

use super::Config;
use super::backends::Action;

/// A single validation finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationWarning {
    /// Config section the finding belongs to (`symlinks`, `backends`, `tasks`).
    pub source: String,
    /// The offending item.
    pub item: String,
    /// What is wrong with it.
    pub message: String,
}

impl ValidationWarning {
    fn new(source: &str, item: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            source: source.to_string(),
            item: item.into(),
            message: message.into(),
        }
    }
}

/// Run every check against `config`.
#[must_use]
pub fn validate(config: &Config) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();
    check_symlinks(config, &mut warnings);
    check_backends(config, &mut warnings);
    if !config.tasks.is_empty() {
        warnings.push(ValidationWarning::new(
            "tasks",
            format!("{} entries", config.tasks.len()),
            "tasks are reserved and currently ignored",
        ));
    }
    warnings
}

fn check_symlinks(config: &Config, warnings: &mut Vec<ValidationWarning>) {
    let mut seen = HashSet::new();
    for spec in &config.symlinks {
        let to = spec.to.display().to_string();
        if !seen.insert(&spec.to) {
            warnings.push(ValidationWarning::new(
                "symlinks",
                &to,
                "link location declared more than once",
            ));
        }
        if !config.root.join(&spec.from).exists() {
            warnings.push(ValidationWarning::new(
                "symlinks",
                &to,
                format!("source does not exist: {}", spec.from.display()),
            ));
        }
    }
}

fn check_backends(config: &Config, warnings: &mut Vec<ValidationWarning>) {
    for backend in &config.backends {
        if !backend.packages.is_empty() && !backend.supports(Action::Install) {
            warnings.push(ValidationWarning::new(
                "backends",
                &backend.name,
                "packages are declared but there is no install command",
            ));
        }
    }
}
