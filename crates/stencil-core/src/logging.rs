use crate::config::LoggingSettings;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const LOG_FILE: &str = "stencil.log";

/// Where `stencil.log` goes: the configured directory, else `<data_dir>/logs`.
pub fn log_dir(settings: &LoggingSettings, data_dir: &Path) -> PathBuf {
    settings
        .dir
        .clone()
        .unwrap_or_else(|| data_dir.join("logs"))
}

/// Log to `<log_dir>/stencil.log` without colors, and to stderr so stdout
/// stays clean for merged content. `RUST_LOG` overrides `level`.
///
/// Hold the returned guard until exit or buffered lines are lost.
pub fn init_logging(log_dir: &Path, level: &str) -> anyhow::Result<WorkerGuard> {
    std::fs::create_dir_all(log_dir)?;

    let (file_writer, guard) = tracing_appender::non_blocking(rolling::never(log_dir, LOG_FILE));
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_writer)
                .with_ansi(false)
                .with_target(false),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .without_time(),
        )
        .try_init()?;

    Ok(guard)
}
