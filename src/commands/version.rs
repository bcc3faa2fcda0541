//! Command: print version information.

/// Version string baked in at build time, falling back to the package version.
#[must_use]
pub fn version() -> &'static str {
    option_env!("GOOT_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"))
}

/// Print the version to stdout.
pub fn run() {
    println!("goot {}", version());
}
