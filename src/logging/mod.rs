//! Console and log-file output.
//!
//! Tasks report through the [`Log`] trait. [`Logger`] turns those reports
//! into `tracing` events and remembers each task's outcome for the summary.
//! [`init_subscriber`] decides where the events are written.

mod logger;
mod subscriber;
mod types;
mod utils;

pub use logger::Logger;
pub use subscriber::{LOG_ENV, init_subscriber};
pub use types::{Log, TaskEntry, TaskStatus};
pub use utils::log_file_path;

/// A [`Logger`] whose events go to a log file in a fresh temporary
/// directory, through a subscriber scoped to the current thread.
///
/// Keep the returned directory and guard alive for the whole test.
#[cfg(test)]
#[allow(clippy::expect_used)]
pub(crate) fn capture_logger() -> (Logger, tempfile::TempDir, tracing::subscriber::DefaultGuard) {
    use tracing_subscriber::{Layer as _, filter::LevelFilter, layer::SubscriberExt as _};

    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("goot").join("test.log");
    let layer = subscriber::FileLayer::create(&path, "test").expect("create log file");
    let guard = tracing::subscriber::set_default(
        tracing_subscriber::registry().with(layer.with_filter(LevelFilter::DEBUG)),
    );
    (Logger::new(Some(path)), dir, guard)
}
