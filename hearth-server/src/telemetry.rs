use anyhow::Result;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::config::LogConfig;

/// Initialize tracing for a server binary.
///
/// With a log directory configured, JSON lines go to a daily rolling file through a
/// non-blocking writer; the returned guard must be kept alive for the life of the process
/// or buffered lines are lost. Without one, logs are human readable on stdout.
pub fn init_tracing(log: &LogConfig) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match &log.directory {
        Some(directory) => {
            std::fs::create_dir_all(directory)?;
            let file_appender = tracing_appender::rolling::daily(directory, &log.file_name);
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            tracing_subscriber::fmt()
                .json()
                .with_writer(non_blocking)
                .with_env_filter(filter)
                .init();
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
            Ok(None)
        }
    }
}
