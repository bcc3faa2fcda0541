//! Console and log-file rendering of [`tracing`] events.
//!
//! Both outputs classify events the same way ([`Kind`]); they differ only in
//! decoration. The log file is never opened in dry-run mode, so a dry run
//! leaves the filesystem untouched.
use std::fs::{self, File};
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{Event, Level};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

use super::utils::{log_file_path, strip_ansi, utc_now};

/// Environment variable holding an [`EnvFilter`](tracing_subscriber::EnvFilter)
/// directive for console output (e.g. `GOOT_LOG=debug`).
pub const LOG_ENV: &str = "GOOT_LOG";

/// Target for stage headers.
pub(super) const STAGE_TARGET: &str = "goot::stage";
/// Target for changes held back by dry-run.
pub(super) const DRY_RUN_TARGET: &str = "goot::dry_run";

/// Rendering class of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Stage,
    DryRun,
    Error,
    Warn,
    Info,
    Debug,
}

impl Kind {
    fn of(level: Level, target: &str) -> Self {
        match (level, target) {
            (Level::ERROR, _) => Self::Error,
            (Level::WARN, _) => Self::Warn,
            (Level::INFO, STAGE_TARGET) => Self::Stage,
            (Level::INFO, DRY_RUN_TARGET) => Self::DryRun,
            (Level::INFO, _) => Self::Info,
            _ => Self::Debug,
        }
    }

    fn of_event(event: &Event<'_>) -> Self {
        let meta = event.metadata();
        Self::of(*meta.level(), meta.target())
    }

    const fn file_prefix(self) -> &'static str {
        match self {
            Self::Stage => "==> ",
            Self::DryRun => "    [dry run] ",
            Self::Error => "    [error] ",
            Self::Warn => "    [warn] ",
            Self::Info => "    ",
            Self::Debug => "    [debug] ",
        }
    }
}

/// The `message` field of `event`.
fn message(event: &Event<'_>) -> String {
    struct Message(String);

    impl tracing::field::Visit for Message {
        fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
            if field.name() == "message" {
                value.clone_into(&mut self.0);
            }
        }

        fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
            if field.name() == "message" {
                self.0 = format!("{value:?}");
            }
        }
    }

    let mut visitor = Message(String::new());
    event.record(&mut visitor);
    visitor.0
}

/// Appends every event, ANSI-free and timestamped, to one run's log file.
#[derive(Debug)]
pub(super) struct FileLayer {
    file: Mutex<File>,
}

impl FileLayer {
    /// Create (or truncate) the log file at `path` and write the run header.
    pub(super) fn create(path: &Path, command: &str) -> io::Result<Self> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let mut file = File::create(path)?;
        writeln!(
            file,
            "# goot {} {command}, started {}",
            crate::commands::version::version(),
            utc_now("%Y-%m-%d %H:%M:%S UTC")
        )?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for FileLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let line = format!(
            "[{}] {}{}",
            utc_now("%H:%M:%S"),
            Kind::of_event(event).file_prefix(),
            strip_ansi(&message(event))
        );
        if let Ok(mut file) = self.file.lock() {
            writeln!(file, "{line}").ok();
        }
    }
}

/// Open the log file for `command` at `path`, unless this is a dry run.
///
/// A file that cannot be created only costs the run its log.
fn open_log(path: PathBuf, command: &str, dry_run: bool) -> Option<(PathBuf, FileLayer)> {
    if dry_run {
        return None;
    }
    let layer = FileLayer::create(&path, command).ok()?;
    Some((path, layer))
}

/// Console rendering: stage arrows, dry-run tags, coloured problems.
struct ConsoleFormat;

impl<S, N> FormatEvent<S, N> for ConsoleFormat
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let msg = message(event);
        match Kind::of_event(event) {
            Kind::Stage => writeln!(writer, "\x1b[1;34m==>\x1b[0m \x1b[1m{msg}\x1b[0m"),
            Kind::DryRun => writeln!(writer, "  \x1b[33m[DRY RUN]\x1b[0m {msg}"),
            Kind::Error => writeln!(writer, "\x1b[31merror:\x1b[0m {msg}"),
            Kind::Warn => writeln!(writer, "\x1b[33mwarning:\x1b[0m {msg}"),
            Kind::Info => writeln!(writer, "  {msg}"),
            Kind::Debug => writeln!(writer, "  \x1b[2m{msg}\x1b[0m"),
        }
    }
}

/// Install the global subscriber for `command` and return the log file path,
/// if a log file is being written.
///
/// Console verbosity comes from `$GOOT_LOG` when set, otherwise from
/// `verbose`. Warnings and errors go to stderr, the rest to stdout. Outside
/// dry-run, `debug` and above are also written to
/// `$XDG_CACHE_HOME/goot/<command>.log`.
pub fn init_subscriber(verbose: bool, command: &str, dry_run: bool) -> Option<PathBuf> {
    use tracing_subscriber::fmt::writer::MakeWriterExt as _;
    use tracing_subscriber::{
        EnvFilter, Layer as _, filter::LevelFilter, fmt, layer::SubscriberExt as _,
        util::SubscriberInitExt as _,
    };

    let console_filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "info" }));

    let console = fmt::layer()
        .event_format(ConsoleFormat)
        .with_writer(io::stderr.with_max_level(Level::WARN).or_else(io::stdout))
        .with_filter(console_filter);

    let (log_file, file_layer) = open_log(log_file_path(command), command, dry_run)
        .map_or((None, None), |(path, layer)| {
            (Some(path), Some(layer.with_filter(LevelFilter::DEBUG)))
        });

    tracing_subscriber::registry()
        .with(console)
        .with(file_layer)
        .init();

    log_file
}
