//! Logging initialization with optional file-based daily rotation.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::config::RuntimeConfig;

const LOG_FILE_NAME: &str = "warden.log";

/// Initialize the tracing subscriber.
///
/// - `to_file=true` and a log dir configured → daily rotating file appender
///   with a non-blocking writer
/// - otherwise → stderr output
///
/// Returns an `Option<WorkerGuard>` that **must be held** for the lifetime of
/// the process to ensure buffered logs are flushed on shutdown.
pub fn init_logging(config: &RuntimeConfig, to_file: bool) -> Option<WorkerGuard> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    match config.log_dir.as_deref() {
        Some(dir) if to_file => {
            let file_appender = tracing_appender::rolling::daily(dir, LOG_FILE_NAME);
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(non_blocking)
                .with_ansi(false)
                .init();

            Some(guard)
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();

            None
        }
    }
}
