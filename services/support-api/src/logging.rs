//! Logging setup
//!
//! Events go to stdout and, without ANSI colours, to the configured log file.
//! Every line carries the source file and line of the call site.

use anyhow::{Context, Result};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Default filter when `RUST_LOG` is not set
const DEFAULT_FILTER: &str = "info,tower_http=info,sqlx=warn";

/// Split a log file path into its directory and file name.
///
/// A bare file name logs into the current directory.
pub fn split_log_path(log_file_path: &str) -> Result<(&Path, &str)> {
    let path = Path::new(log_file_path);
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .with_context(|| format!("Log file path '{}' has no file name", log_file_path))?;
    let dir = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    Ok((dir, file_name))
}

/// Install the global subscriber.
///
/// The returned guard flushes the file writer when dropped, so it has to live
/// until the process exits.
pub fn init(log_file_path: &str) -> Result<WorkerGuard> {
    let (dir, file_name) = split_log_path(log_file_path)?;
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

    let file_appender = tracing_appender::rolling::never(dir, file_name);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_file(true).with_line_number(true))
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_file(true)
                .with_line_number(true)
                .with_writer(file_writer),
        )
        .try_init()
        .context("setting default subscriber failed")?;

    tracing::info!("Logging initialized, writing to {}", log_file_path);
    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_log_path() {
        let (dir, file) = split_log_path("logs/app.log").unwrap();
        assert_eq!(dir, Path::new("logs"));
        assert_eq!(file, "app.log");
    }

    #[test]
    fn test_bare_file_name_logs_to_current_dir() {
        let (dir, file) = split_log_path("app.log").unwrap();
        assert_eq!(dir, Path::new("."));
        assert_eq!(file, "app.log");
    }

    #[test]
    fn test_path_without_file_name_is_rejected() {
        assert!(split_log_path("/").is_err());
    }
}
