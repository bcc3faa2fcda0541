// Shared helpers for integration tests.
//
// Provides a temporary-directory-backed config repository and a fluent
// builder so each integration test can set up an isolated environment
// without repeating filesystem boilerplate.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use goot::cli::{AddOpts, DumpOpts, RunOpts};
use goot::exec::SystemExecutor;
use goot::logging::Logger;

/// Name of the config file written by [`TestRepoBuilder::config`].
pub const CONFIG_FILE: &str = "config.yaml";

/// An isolated config repository backed by a [`tempfile::TempDir`].
pub struct TestRepo {
    dir: tempfile::TempDir,
    root: PathBuf,
}

impl TestRepo {
    /// Directory containing the config file.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path of `rel` inside the repository.
    pub fn path(&self, rel: &str) -> PathBuf {
        self.root.join(rel)
    }

    /// Absolute path of the config file.
    pub fn config_path(&self) -> PathBuf {
        self.root.join(CONFIG_FILE)
    }

    /// CLI options for running against this repository.
    pub fn opts(&self, dry_run: bool) -> RunOpts {
        RunOpts {
            config: self.config_path(),
            dry_run,
        }
    }

    /// Run `ensure` through the library entry point.
    pub fn ensure(&self, dry_run: bool) -> anyhow::Result<()> {
        let log = Arc::new(Logger::default());
        goot::commands::ensure::run(&self.opts(dry_run), &log)
    }

    /// Run `update` through the library entry point.
    pub fn update(&self, dry_run: bool) -> anyhow::Result<()> {
        let log = Arc::new(Logger::default());
        goot::commands::update::run(&self.opts(dry_run), &log)
    }

    /// Run `add` for `file`, treating `home` as the user's home directory.
    pub fn add(
        &self,
        file: &Path,
        dest: Option<&str>,
        dry_run: bool,
        home: &Path,
    ) -> anyhow::Result<()> {
        let opts = AddOpts {
            run: self.opts(dry_run),
            file: file.to_path_buf(),
            dest: dest.map(PathBuf::from),
        };
        let log = Arc::new(Logger::default());
        goot::commands::add::run_with(&opts, &log, Some(home))
    }

    /// Run `dump` over `dirs` with the default depth.
    pub fn dump(&self, dirs: &[&Path], dry_run: bool) -> anyhow::Result<()> {
        let opts = DumpOpts {
            run: self.opts(dry_run),
            dirs: dirs.iter().map(|dir| dir.to_path_buf()).collect(),
            depth: 2,
            ignore: Vec::new(),
        };
        let log = Arc::new(Logger::default());
        goot::commands::dump::run_with(&opts, &log, Arc::new(SystemExecutor), None)
    }

    /// Recursive snapshot of the repository: relative path to a description
    /// of the entry (file contents, link target, or `<dir>`).
    pub fn listing(&self) -> BTreeMap<String, String> {
        let mut out = BTreeMap::new();
        walk(&self.root, &self.root, &mut out);
        out
    }
}

fn walk(root: &Path, dir: &Path, out: &mut BTreeMap<String, String>) {
    let mut entries: Vec<_> = std::fs::read_dir(dir)
        .expect("read dir")
        .map(|e| e.expect("dir entry").path())
        .collect();
    entries.sort();
    for path in entries {
        let rel = path
            .strip_prefix(root)
            .expect("strip prefix")
            .display()
            .to_string();
        let meta = std::fs::symlink_metadata(&path).expect("metadata");
        if meta.is_symlink() {
            let dest = std::fs::read_link(&path).expect("read link");
            out.insert(rel, format!("-> {}", dest.display()));
        } else if meta.is_dir() {
            out.insert(rel, "<dir>".to_string());
            walk(root, &path, out);
        } else {
            let bytes = std::fs::read(&path).expect("read file");
            out.insert(rel, String::from_utf8_lossy(&bytes).to_string());
        }
    }
}

/// A canonical temporary directory standing in for the user's home.
pub struct TestHome {
    _dir: tempfile::TempDir,
    path: PathBuf,
}

impl TestHome {
    /// Create an empty home directory.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dunce::canonicalize(dir.path()).expect("canonicalize temp dir");
        Self { _dir: dir, path }
    }

    /// The home directory itself.
    pub fn root(&self) -> &Path {
        &self.path
    }

    /// Absolute path of `rel` inside the home directory.
    pub fn path(&self, rel: &str) -> PathBuf {
        self.path.join(rel)
    }

    /// Write `content` to `rel`, creating parent directories.
    pub fn file(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.path(rel);
        std::fs::create_dir_all(path.parent().expect("parent")).expect("create parent dir");
        std::fs::write(&path, content).expect("write file");
        path
    }
}

/// Fluent builder for [`TestRepo`].
pub struct TestRepoBuilder {
    repo: TestRepo,
}

impl TestRepoBuilder {
    /// Begin building an empty repository.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let root = dunce::canonicalize(dir.path()).expect("canonicalize temp dir");
        Self {
            repo: TestRepo { dir, root },
        }
    }

    /// Write `content` to `rel`, creating parent directories.
    pub fn file(self, rel: &str, content: &str) -> Self {
        let path = self.repo.path(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent dir");
        }
        std::fs::write(&path, content).expect("write file");
        self
    }

    /// Write the config file.
    pub fn config(self, yaml: &str) -> Self {
        self.file(CONFIG_FILE, yaml)
    }

    /// Finish building.
    pub fn build(self) -> TestRepo {
        self.repo
    }
}
