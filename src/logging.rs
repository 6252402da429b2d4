use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;

/// Keeps the background file writer alive for the life of the process;
/// dropping it loses buffered log lines.
pub struct FileLogGuard {
    _guard: WorkerGuard,
}

fn prepare_log_dir(dir: &Path) -> std::io::Result<&Path> {
    std::fs::create_dir_all(dir)?;
    Ok(dir)
}

/// Logs to stdout always, and to a daily-rolling `ellinaki.log` when the
/// config carries a log directory. An unusable directory falls back to
/// stdout only.
pub fn init_tracing(config: &Config) -> Option<FileLogGuard> {
    let env_filter =
        EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true));

    match config.log_dir.as_deref().map(prepare_log_dir) {
        Some(Ok(dir)) => {
            let appender = RollingFileAppender::new(Rotation::DAILY, dir, "ellinaki.log");
            let (file_writer, guard) = tracing_appender::non_blocking(appender);
            registry
                .with(
                    fmt::layer()
                        .with_writer(file_writer)
                        .with_ansi(false)
                        .with_target(true),
                )
                .init();
            Some(FileLogGuard { _guard: guard })
        }
        Some(Err(err)) => {
            eprintln!("log directory is unusable, logging to stdout only: {err}");
            registry.init();
            None
        }
        None => {
            registry.init();
            None
        }
    }
}
