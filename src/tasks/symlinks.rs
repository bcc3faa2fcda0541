//! Symlink tasks: converge declared links, adopt files into the config
//! directory, and declare links found on disk.
use anyhow::{Context as _, Result, bail};
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

use super::{Context, Task, TaskResult};
use crate::config::symlinks::SymlinkSpec;
use crate::config::{absolute_path, writer};
use crate::logging::Log;
use crate::resources::error::ResourceError;
use crate::resources::helpers::fs::ensure_parent_dir;
use crate::resources::symlink::SymlinkResource;
use crate::resources::{Applicable as _, Resource as _, ResourceChange, ResourceState};

/// Converge one declared link location onto its source.
///
/// An occupied location is never touched: anything other than a link that
/// already resolves to the source is reported as a conflict, in dry-run too.
#[derive(Debug)]
pub struct EnsureSymlink {
    name: String,
    spec: SymlinkSpec,
}

impl EnsureSymlink {
    /// Create the task for `spec`.
    #[must_use]
    pub fn new(spec: SymlinkSpec) -> Self {
        Self {
            name: format!("link {}", spec.to.display()),
            spec,
        }
    }
}

impl Task for EnsureSymlink {
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let root = ctx.root();
        let resource = SymlinkResource::new(root.join(&self.spec.from), root.join(&self.spec.to));

        match resource.current_state()? {
            ResourceState::Correct => {
                ctx.log
                    .debug(&format!("ok: {} (already linked)", resource.description()));
                Ok(TaskResult::Ok)
            }
            ResourceState::Invalid { .. } => Err(ResourceError::SourceMissing {
                path: resource.source,
            }
            .into()),
            ResourceState::Incorrect { current } => Err(ResourceError::Conflict {
                target: resource.target,
                current,
            }
            .into()),
            ResourceState::Missing if ctx.dry_run => {
                ctx.log
                    .dry_run(&format!("would link {}", resource.description()));
                Ok(TaskResult::DryRun)
            }
            ResourceState::Missing => match resource.apply()? {
                ResourceChange::Applied => {
                    ctx.log.info(&format!("linked {}", resource.description()));
                    Ok(TaskResult::Ok)
                }
                ResourceChange::AlreadyCorrect => Ok(TaskResult::Ok),
            },
        }
    }
}

/// Declare `specs` in `config_file`, or report them in dry-run.
fn declare(ctx: &Context, config_file: &Path, specs: &[SymlinkSpec]) -> Result<TaskResult> {
    if ctx.dry_run {
        for spec in specs.iter().filter(|spec| !ctx.config.symlinks.contains(spec)) {
            ctx.log.dry_run(&format!(
                "would declare {} -> {}",
                spec.to.display(),
                spec.from.display()
            ));
        }
        return Ok(TaskResult::DryRun);
    }

    let added = writer::append_symlinks(config_file, specs)
        .with_context(|| format!("recording symlinks in {}", config_file.display()))?;
    if added.is_empty() {
        ctx.log.debug("nothing new to declare");
    }
    for spec in &added {
        ctx.log.info(&format!(
            "declared {} -> {}",
            spec.to.display(),
            spec.from.display()
        ));
    }
    Ok(TaskResult::Ok)
}

/// Move a file into the config directory, link it back from where it was,
/// and declare the link in the config file.
#[derive(Debug)]
pub struct AdoptFile {
    name: String,
    config_file: PathBuf,
    /// Current location of the file; becomes the link.
    file: PathBuf,
    /// Where the file moves to, inside the config root.
    dest: PathBuf,
    spec: SymlinkSpec,
}

impl AdoptFile {
    /// Plan adopting `file` into `root`.
    ///
    /// Without `dest`, the file keeps its path relative to `home` (or its
    /// absolute path, minus the root, when it lives outside `home`). An
    /// explicit `dest` is taken relative to `root` and must stay inside it.
    ///
    /// # Errors
    ///
    /// Returns an error if `file` cannot be made absolute, if it contains
    /// `root`, or if the destination falls outside `root`.
    pub fn new(
        config_file: PathBuf,
        root: &Path,
        home: Option<&Path>,
        file: &Path,
        dest: Option<&Path>,
    ) -> Result<Self> {
        let file = absolute_path(file)?;
        if root.starts_with(&file) {
            bail!(
                "cannot add {}: it contains the config directory",
                file.display()
            );
        }

        let dest = match dest {
            Some(dest) => {
                if dest.components().any(|c| c == Component::ParentDir) {
                    bail!("destination {} must not contain '..'", dest.display());
                }
                root.join(dest)
            }
            None => root.join(default_dest(home, &file)),
        };
        if dest == root || !dest.starts_with(root) {
            bail!(
                "destination {} is not inside {}",
                dest.display(),
                root.display()
            );
        }
        if dest == file {
            bail!("{} is already in the config directory", file.display());
        }

        let spec = SymlinkSpec::new(
            dest.strip_prefix(root).unwrap_or(dest.as_path()),
            file.strip_prefix(root).unwrap_or(file.as_path()),
        );
        Ok(Self {
            name: format!("add {}", file.display()),
            config_file,
            file,
            dest,
            spec,
        })
    }

    /// The declaration this task records.
    #[must_use]
    pub const fn spec(&self) -> &SymlinkSpec {
        &self.spec
    }
}

/// `file` relative to `home`, or `file` without its root.
fn default_dest(home: Option<&Path>, file: &Path) -> PathBuf {
    home.and_then(|home| file.strip_prefix(home).ok())
        .filter(|rel| !rel.as_os_str().is_empty())
        .map_or_else(
            || {
                file.components()
                    .filter(|c| matches!(c, Component::Normal(_)))
                    .collect()
            },
            Path::to_path_buf,
        )
}

/// Rename the link location onto the source, then link it back.
///
/// A failed link puts the file back where it was.
fn move_and_link(resource: &SymlinkResource) -> Result<()> {
    ensure_parent_dir(&resource.source)?;
    std::fs::rename(&resource.target, &resource.source).with_context(|| {
        format!(
            "moving {} to {}",
            resource.target.display(),
            resource.source.display()
        )
    })?;

    if let Err(e) = resource.apply() {
        if let Err(restore) = std::fs::rename(&resource.source, &resource.target) {
            return Err(e.context(format!(
                "restoring {} also failed: {restore}",
                resource.target.display()
            )));
        }
        return Err(e);
    }
    Ok(())
}

impl Task for AdoptFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let resource = SymlinkResource::new(self.dest.clone(), self.file.clone());

        match resource.current_state()? {
            ResourceState::Correct => {
                ctx.log
                    .debug(&format!("ok: {} (already linked)", resource.description()));
            }
            ResourceState::Missing | ResourceState::Incorrect { .. } => {
                return Err(ResourceError::Conflict {
                    target: self.dest.clone(),
                    current: "already exists in the config directory".to_string(),
                }
                .into());
            }
            ResourceState::Invalid { .. } => {
                let meta = match self.file.symlink_metadata() {
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                        return Err(ResourceError::SourceMissing {
                            path: self.file.clone(),
                        }
                        .into());
                    }
                    other => other
                        .with_context(|| format!("reading metadata: {}", self.file.display()))?,
                };
                if meta.is_symlink() {
                    bail!(
                        "{} is a symlink; add the file it points to instead",
                        self.file.display()
                    );
                }

                if ctx.dry_run {
                    ctx.log.dry_run(&format!(
                        "would move {} to {}",
                        self.file.display(),
                        self.dest.display()
                    ));
                    ctx.log
                        .dry_run(&format!("would link {}", resource.description()));
                } else {
                    move_and_link(&resource)?;
                    ctx.log.info(&format!(
                        "moved {} to {}",
                        self.file.display(),
                        self.dest.display()
                    ));
                    ctx.log.info(&format!("linked {}", resource.description()));
                }
            }
        }

        declare(ctx, &self.config_file, std::slice::from_ref(&self.spec))
    }
}

/// Entry names never descended into while scanning for links.
const ALWAYS_IGNORED: [&str; 2] = [".git", ".Trash"];

/// Declare every symlink found under a set of directories that resolves to
/// something inside the config root.
///
/// Dangling links and links pointing elsewhere are ignored. The config root
/// itself is never scanned.
#[derive(Debug)]
pub struct DumpSymlinks {
    config_file: PathBuf,
    dirs: Vec<PathBuf>,
    depth: usize,
    ignore: Vec<String>,
}

impl DumpSymlinks {
    /// Scan each of `dirs` down to `depth` levels, skipping entries named in
    /// `ignore` as well as `.git` and `.Trash`.
    #[must_use]
    pub const fn new(
        config_file: PathBuf,
        dirs: Vec<PathBuf>,
        depth: usize,
        ignore: Vec<String>,
    ) -> Self {
        Self {
            config_file,
            dirs,
            depth,
            ignore,
        }
    }

    fn is_ignored(&self, name: &std::ffi::OsStr) -> bool {
        name.to_str().is_some_and(|name| {
            ALWAYS_IGNORED.contains(&name) || self.ignore.iter().any(|ignored| ignored == name)
        })
    }

    fn scan(&self, dir: &Path, root: &Path, canonical_root: &Path, log: &dyn Log) -> Vec<SymlinkSpec> {
        WalkDir::new(dir)
            .min_depth(1)
            .max_depth(self.depth)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                !self.is_ignored(entry.file_name())
                    && entry.path() != root
                    && entry.path() != canonical_root
            })
            .filter_map(|entry| {
                entry
                    .map_err(|e| log.debug(&format!("skipping unreadable entry: {e}")))
                    .ok()
            })
            .filter(walkdir::DirEntry::path_is_symlink)
            .filter_map(|entry| link_spec(entry.path(), root, canonical_root))
            .collect()
    }
}

/// Declaration for `link` if it resolves to something inside the root.
fn link_spec(link: &Path, root: &Path, canonical_root: &Path) -> Option<SymlinkSpec> {
    let resolved = dunce::canonicalize(link).ok()?;
    let from = resolved.strip_prefix(canonical_root).ok()?;
    if from.as_os_str().is_empty() {
        return None;
    }
    Some(SymlinkSpec::new(from, link.strip_prefix(root).unwrap_or(link)))
}

impl Task for DumpSymlinks {
    fn name(&self) -> &str {
        "dump symlinks"
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let root = ctx.root();
        let canonical_root = dunce::canonicalize(&root)
            .with_context(|| format!("resolving {}", root.display()))?;

        let mut found = Vec::new();
        for dir in &self.dirs {
            ctx.log.debug(&format!(
                "scanning {} to depth {}",
                dir.display(),
                self.depth
            ));
            found.extend(self.scan(dir, &root, &canonical_root, ctx.log.as_ref()));
        }
        ctx.log.info(&format!(
            "found {} link(s) into {}",
            found.len(),
            root.display()
        ));

        declare(ctx, &self.config_file, &found)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::tasks::test_helpers::{make_context, make_dry_run_context};
    use std::path::PathBuf;

    fn root_with_source() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let root = dunce::canonicalize(dir.path()).unwrap();
        std::fs::write(root.join("a.txt"), "foo").unwrap();
        (dir, root)
    }

    #[test]
    fn name_uses_link_location() {
        let task = EnsureSymlink::new(SymlinkSpec::new("a.txt", "dir/b.txt"));
        assert_eq!(task.name(), "link dir/b.txt");
    }

    #[test]
    fn creates_missing_link() {
        let (_dir, root) = root_with_source();
        let (ctx, _log) = make_context(root.clone());
        let task = EnsureSymlink::new(SymlinkSpec::new("a.txt", "b.txt"));

        assert!(matches!(task.run(&ctx).unwrap(), TaskResult::Ok));
        assert_eq!(std::fs::read_to_string(root.join("b.txt")).unwrap(), "foo");
    }

    #[test]
    fn second_run_is_noop() {
        let (_dir, root) = root_with_source();
        let (ctx, _log) = make_context(root);
        let task = EnsureSymlink::new(SymlinkSpec::new("a.txt", "b.txt"));
        task.run(&ctx).unwrap();
        assert!(matches!(task.run(&ctx).unwrap(), TaskResult::Ok));
    }

    #[test]
    fn dry_run_creates_nothing() {
        let (_dir, root) = root_with_source();
        let (ctx, _log) = make_dry_run_context(root.clone());
        let task = EnsureSymlink::new(SymlinkSpec::new("a.txt", "x/y/b.txt"));

        assert!(matches!(task.run(&ctx).unwrap(), TaskResult::DryRun));
        assert!(!root.join("x").exists());
    }

    #[test]
    fn occupied_target_is_conflict_even_in_dry_run() {
        let (_dir, root) = root_with_source();
        std::fs::write(root.join("b.txt"), "bar").unwrap();
        let (ctx, _log) = make_dry_run_context(root.clone());
        let task = EnsureSymlink::new(SymlinkSpec::new("a.txt", "b.txt"));

        let err = task.run(&ctx).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ResourceError>(),
            Some(ResourceError::Conflict { .. })
        ));
        assert_eq!(std::fs::read_to_string(root.join("b.txt")).unwrap(), "bar");
    }

    #[test]
    fn missing_source_is_error() {
        let (_dir, root) = root_with_source();
        let (ctx, _log) = make_context(root);
        let task = EnsureSymlink::new(SymlinkSpec::new("nope.txt", "b.txt"));
        let err = task.run(&ctx).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ResourceError>(),
            Some(ResourceError::SourceMissing { .. })
        ));
    }

    /// A home directory and a config repository side by side.
    struct Layout {
        _dir: tempfile::TempDir,
        home: PathBuf,
        root: PathBuf,
    }

    impl Layout {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let base = dunce::canonicalize(dir.path()).unwrap();
            let home = base.join("home");
            let root = base.join("dots");
            std::fs::create_dir_all(&home).unwrap();
            std::fs::create_dir_all(&root).unwrap();
            std::fs::write(root.join("config.yaml"), "symlinks: []\n").unwrap();
            Self {
                _dir: dir,
                home,
                root,
            }
        }

        fn config_file(&self) -> PathBuf {
            self.root.join("config.yaml")
        }

        fn declared(&self) -> Vec<SymlinkSpec> {
            crate::config::Config::load(&self.config_file())
                .unwrap()
                .symlinks
        }

        fn adopt(&self, file: &str) -> AdoptFile {
            AdoptFile::new(
                self.config_file(),
                &self.root,
                Some(&self.home),
                &self.home.join(file),
                None,
            )
            .unwrap()
        }
    }

    #[test]
    fn adopt_destination_follows_home_layout() {
        let task = AdoptFile::new(
            PathBuf::from("/dots/config.yaml"),
            Path::new("/dots"),
            Some(Path::new("/home/u")),
            Path::new("/home/u/.config/nvim/init.vim"),
            None,
        )
        .unwrap();
        assert_eq!(
            task.spec(),
            &SymlinkSpec::new(".config/nvim/init.vim", "/home/u/.config/nvim/init.vim")
        );
        assert_eq!(task.name(), "add /home/u/.config/nvim/init.vim");
    }

    #[test]
    fn adopt_outside_home_keeps_absolute_layout() {
        assert_eq!(
            default_dest(Some(Path::new("/home/u")), Path::new("/etc/hosts")),
            PathBuf::from("etc/hosts")
        );
        assert_eq!(
            default_dest(None, Path::new("/home/u/.vimrc")),
            PathBuf::from("home/u/.vimrc")
        );
    }

    #[test]
    fn adopt_explicit_destination_is_under_root() {
        let task = AdoptFile::new(
            PathBuf::from("/dots/config.yaml"),
            Path::new("/dots"),
            None,
            Path::new("/home/u/.vimrc"),
            Some(Path::new("vim/vimrc")),
        )
        .unwrap();
        assert_eq!(task.spec(), &SymlinkSpec::new("vim/vimrc", "/home/u/.vimrc"));
    }

    #[test]
    fn adopt_rejects_destination_outside_root() {
        for dest in ["/elsewhere/vimrc", "../vimrc"] {
            let result = AdoptFile::new(
                PathBuf::from("/dots/config.yaml"),
                Path::new("/dots"),
                None,
                Path::new("/home/u/.vimrc"),
                Some(Path::new(dest)),
            );
            assert!(result.is_err(), "accepted {dest}");
        }
    }

    #[test]
    fn adopt_rejects_directory_containing_root() {
        let result = AdoptFile::new(
            PathBuf::from("/home/u/dots/config.yaml"),
            Path::new("/home/u/dots"),
            Some(Path::new("/home/u")),
            Path::new("/home/u"),
            None,
        );
        assert!(result.is_err());
    }

    #[test]
    fn adopt_moves_links_and_declares() {
        let layout = Layout::new();
        std::fs::write(layout.home.join(".vimrc"), "set nu").unwrap();
        let (ctx, _log) = make_context(layout.root.clone());

        let result = layout.adopt(".vimrc").run(&ctx).unwrap();

        assert!(matches!(result, TaskResult::Ok));
        let link = layout.home.join(".vimrc");
        assert!(link.symlink_metadata().unwrap().is_symlink());
        assert_eq!(std::fs::read_to_string(&link).unwrap(), "set nu");
        assert_eq!(
            std::fs::read_to_string(layout.root.join(".vimrc")).unwrap(),
            "set nu"
        );
        assert_eq!(layout.declared(), [SymlinkSpec::new(".vimrc", &link)]);
    }

    #[test]
    fn adopt_twice_declares_once() {
        let layout = Layout::new();
        std::fs::write(layout.home.join(".vimrc"), "set nu").unwrap();
        let (ctx, _log) = make_context(layout.root.clone());

        layout.adopt(".vimrc").run(&ctx).unwrap();
        let again = layout.adopt(".vimrc").run(&ctx).unwrap();

        assert!(matches!(again, TaskResult::Ok));
        assert_eq!(layout.declared().len(), 1);
    }

    #[test]
    fn adopt_dry_run_changes_nothing() {
        let layout = Layout::new();
        std::fs::write(layout.home.join(".vimrc"), "set nu").unwrap();
        let (ctx, _log) = make_dry_run_context(layout.root.clone());

        let result = layout.adopt(".vimrc").run(&ctx).unwrap();

        assert!(matches!(result, TaskResult::DryRun));
        assert!(
            !layout
                .home
                .join(".vimrc")
                .symlink_metadata()
                .unwrap()
                .is_symlink()
        );
        assert!(!layout.root.join(".vimrc").exists());
        assert_eq!(
            std::fs::read_to_string(layout.config_file()).unwrap(),
            "symlinks: []\n"
        );
    }

    #[test]
    fn adopt_onto_existing_destination_is_conflict() {
        let layout = Layout::new();
        std::fs::write(layout.home.join(".vimrc"), "mine").unwrap();
        std::fs::write(layout.root.join(".vimrc"), "theirs").unwrap();
        let (ctx, _log) = make_context(layout.root.clone());

        let err = layout.adopt(".vimrc").run(&ctx).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ResourceError>(),
            Some(ResourceError::Conflict { .. })
        ));
        assert_eq!(
            std::fs::read_to_string(layout.home.join(".vimrc")).unwrap(),
            "mine"
        );
        assert!(layout.declared().is_empty());
    }

    #[test]
    fn adopt_missing_file_is_source_missing() {
        let layout = Layout::new();
        let (ctx, _log) = make_context(layout.root.clone());
        let err = layout.adopt(".vimrc").run(&ctx).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ResourceError>(),
            Some(ResourceError::SourceMissing { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn adopt_refuses_a_symlink() {
        let layout = Layout::new();
        std::fs::write(layout.home.join("real"), "x").unwrap();
        std::os::unix::fs::symlink(layout.home.join("real"), layout.home.join(".vimrc")).unwrap();
        let (ctx, _log) = make_context(layout.root.clone());

        let err = layout.adopt(".vimrc").run(&ctx).unwrap_err();

        assert!(err.to_string().contains("is a symlink"));
        assert!(!layout.root.join(".vimrc").exists());
    }

    #[cfg(unix)]
    fn link(target: &Path, at: &Path) {
        std::fs::create_dir_all(at.parent().unwrap()).unwrap();
        std::os::unix::fs::symlink(target, at).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn dump_declares_links_into_root() {
        let layout = Layout::new();
        std::fs::write(layout.root.join("vimrc"), "").unwrap();
        std::fs::write(layout.root.join("zshrc"), "").unwrap();
        std::fs::write(layout.home.join("unrelated"), "").unwrap();
        link(&layout.root.join("vimrc"), &layout.home.join(".vimrc"));
        link(&layout.root.join("zshrc"), &layout.home.join(".config/zshrc"));
        link(&layout.root.join("vimrc"), &layout.home.join("a/b/too-deep"));
        link(&layout.root.join("vimrc"), &layout.home.join(".git/hooked"));
        link(&layout.home.join("unrelated"), &layout.home.join("elsewhere"));
        link(&layout.root.join("gone"), &layout.home.join("dangling"));
        let (ctx, _log) = make_context(layout.root.clone());

        let task = DumpSymlinks::new(layout.config_file(), vec![layout.home.clone()], 2, Vec::new());
        assert!(matches!(task.run(&ctx).unwrap(), TaskResult::Ok));

        assert_eq!(
            layout.declared(),
            [
                SymlinkSpec::new("zshrc", layout.home.join(".config/zshrc")),
                SymlinkSpec::new("vimrc", layout.home.join(".vimrc")),
            ]
        );
    }

    #[cfg(unix)]
    #[test]
    fn dump_honours_ignore_names() {
        let layout = Layout::new();
        std::fs::write(layout.root.join("vimrc"), "").unwrap();
        link(&layout.root.join("vimrc"), &layout.home.join("skip/.vimrc"));
        let (ctx, _log) = make_context(layout.root.clone());

        let task = DumpSymlinks::new(
            layout.config_file(),
            vec![layout.home.clone()],
            2,
            vec!["skip".to_string()],
        );
        task.run(&ctx).unwrap();

        assert!(layout.declared().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn dump_dry_run_leaves_config_untouched() {
        let layout = Layout::new();
        std::fs::write(layout.root.join("vimrc"), "").unwrap();
        link(&layout.root.join("vimrc"), &layout.home.join(".vimrc"));
        let (ctx, _log) = make_dry_run_context(layout.root.clone());

        let task = DumpSymlinks::new(layout.config_file(), vec![layout.home.clone()], 2, Vec::new());
        assert!(matches!(task.run(&ctx).unwrap(), TaskResult::DryRun));
        assert_eq!(
            std::fs::read_to_string(layout.config_file()).unwrap(),
            "symlinks: []\n"
        );
    }
}
