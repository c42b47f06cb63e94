//! Logging Infrastructure
//!
//! Logs go to stderr (stdout carries job reports), or to a daily rolling
//! file when a log directory is configured.

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Initialize the logger
///
/// `RUST_LOG` wins over `level`. The returned guard must be held until exit
/// so buffered file output is flushed.
pub fn init_logger(level: &str, log_dir: Option<&str>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("spool={level},spool_printer={level}")));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(false);

    if let Some(dir) = log_dir
        && Path::new(dir).is_dir()
    {
        let file_appender = tracing_appender::rolling::daily(dir, "spool");
        let (writer, guard) = tracing_appender::non_blocking(file_appender);
        subscriber.with_writer(writer).with_ansi(false).init();
        return Some(guard);
    }

    subscriber.with_writer(std::io::stderr).init();
    None
}
