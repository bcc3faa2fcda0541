//! Command-line interface definition.
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Top-level CLI entry point.
#[derive(Parser, Debug)]
#[command(
    name = "goot",
    about = "Reconcile symlinks and package-manager state from a YAML config",
    version = option_env!("GOOT_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"))
)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Converge backends and symlinks to the config
    Ensure(RunOpts),
    /// Run every backend's update command
    Update(RunOpts),
    /// Move a file into the config directory and link it back
    Add(AddOpts),
    /// Record existing symlinks and installed packages into the config
    Dump(DumpOpts),
    /// Print version information
    Version,
}

impl Command {
    /// Name used for the per-command log file.
    #[must_use]
    pub const fn log_name(&self) -> &'static str {
        match self {
            Self::Ensure(_) => "ensure",
            Self::Update(_) => "update",
            Self::Add(_) => "add",
            Self::Dump(_) => "dump",
            Self::Version => "version",
        }
    }

    /// Whether the command was asked to preview instead of apply.
    #[must_use]
    pub const fn dry_run(&self) -> bool {
        match self {
            Self::Ensure(opts) | Self::Update(opts) => opts.dry_run,
            Self::Add(opts) => opts.run.dry_run,
            Self::Dump(opts) => opts.run.dry_run,
            Self::Version => false,
        }
    }
}

/// Options shared by `ensure` and `update`.
#[derive(Args, Debug, Clone)]
pub struct RunOpts {
    /// Path to the YAML config file
    pub config: PathBuf,

    /// Preview changes without applying
    #[arg(short = 'n', long)]
    pub dry_run: bool,
}

/// Options for `add`.
#[derive(Args, Debug, Clone)]
pub struct AddOpts {
    #[command(flatten)]
    pub run: RunOpts,

    /// File to move into the config directory
    pub file: PathBuf,

    /// Destination inside the config directory [default: FILE relative to home]
    pub dest: Option<PathBuf>,
}

/// Options for `dump`.
#[derive(Args, Debug, Clone)]
pub struct DumpOpts {
    #[command(flatten)]
    pub run: RunOpts,

    /// Directory to scan for symlinks, repeatable [default: home]
    #[arg(long = "dir", value_name = "DIR")]
    pub dirs: Vec<PathBuf>,

    /// Levels below each directory to scan
    #[arg(long, default_value_t = 2)]
    pub depth: usize,

    /// Entry name to skip while scanning, repeatable
    #[arg(long, value_name = "NAME")]
    pub ignore: Vec<String>,
}

#[cfg(test)]
#[allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::panic
)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_ensure() {
        let cli = Cli::parse_from(["goot", "ensure", "config.yaml"]);
        assert!(matches!(
            &cli.command,
            Command::Ensure(opts) if opts.config == PathBuf::from("config.yaml") && !opts.dry_run
        ));
    }

    #[test]
    fn parse_ensure_dry_run_short() {
        let cli = Cli::parse_from(["goot", "ensure", "-n", "config.yaml"]);
        assert!(matches!(&cli.command, Command::Ensure(opts) if opts.dry_run));
    }

    #[test]
    fn parse_update_dry_run_long() {
        let cli = Cli::parse_from(["goot", "update", "--dry-run", "c.yaml"]);
        assert!(matches!(&cli.command, Command::Update(opts) if opts.dry_run));
    }

    #[test]
    fn parse_verbose_after_subcommand() {
        let cli = Cli::parse_from(["goot", "ensure", "c.yaml", "-v"]);
        assert!(cli.verbose);
    }

    #[test]
    fn parse_version() {
        let cli = Cli::parse_from(["goot", "version"]);
        assert!(matches!(cli.command, Command::Version));
        assert_eq!(cli.command.log_name(), "version");
    }

    #[test]
    fn ensure_requires_config() {
        assert!(Cli::try_parse_from(["goot", "ensure"]).is_err());
    }

    #[test]
    fn help_is_a_display_request() {
        for args in [&["goot", "--help"][..], &["goot", "help"][..]] {
            let err = Cli::try_parse_from(args.iter().copied()).unwrap_err();
            assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
        }
    }

    #[test]
    fn parse_add_with_default_destination() {
        let cli = Cli::parse_from(["goot", "add", "-n", "c.yaml", "/home/u/.vimrc"]);
        assert!(matches!(
            &cli.command,
            Command::Add(opts) if opts.run.config == PathBuf::from("c.yaml")
                && opts.file == PathBuf::from("/home/u/.vimrc")
                && opts.dest.is_none()
        ));
        assert!(cli.command.dry_run());
        assert_eq!(cli.command.log_name(), "add");
    }

    #[test]
    fn parse_add_with_destination() {
        let cli = Cli::parse_from(["goot", "add", "c.yaml", ".vimrc", "vim/vimrc"]);
        assert!(matches!(
            &cli.command,
            Command::Add(opts) if opts.dest.as_deref() == Some(std::path::Path::new("vim/vimrc"))
        ));
        assert!(!cli.command.dry_run());
    }

    #[test]
    fn parse_dump_defaults() {
        let cli = Cli::parse_from(["goot", "dump", "c.yaml"]);
        assert!(matches!(
            &cli.command,
            Command::Dump(opts) if opts.dirs.is_empty() && opts.depth == 2 && opts.ignore.is_empty()
        ));
    }

    #[test]
    fn parse_dump_repeated_options() {
        let cli = Cli::parse_from([
            "goot", "dump", "c.yaml", "--dir", "/a", "--dir", "/b", "--depth", "3", "--ignore",
            "node_modules",
        ]);
        let Command::Dump(opts) = &cli.command else {
            panic!("expected dump");
        };
        assert_eq!(opts.dirs, [PathBuf::from("/a"), PathBuf::from("/b")]);
        assert_eq!(opts.depth, 3);
        assert_eq!(opts.ignore, ["node_modules"]);
    }
}
