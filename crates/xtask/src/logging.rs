//! Tracing subscriber setup.

use anyhow::{Context, Result};
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::dirs;

pub const LOG_FILE: &str = "xtask.log";

/// Installs the global subscriber: stderr always, plus a log file on request.
///
/// `RUST_LOG` directives are honoured on top of an `info` floor. Keep the
/// returned guard alive until exit or buffered file output is lost.
pub fn setup_logging(log_file: bool) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::from_default_env().add_directive(Level::INFO.into());
    let stderr_layer = fmt::layer().with_writer(std::io::stderr).with_target(true);

    if !log_file {
        tracing_subscriber::registry()
            .with(filter)
            .with(stderr_layer)
            .init();
        return Ok(None);
    }

    let log_dir = dirs::log_dir();
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;
    let file_appender = tracing_appender::rolling::never(&log_dir, LOG_FILE);
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(fmt::layer().with_writer(non_blocking_file).with_ansi(false))
        .init();

    tracing::info!(path = %log_dir.join(LOG_FILE).display(), "file logging enabled");
    Ok(Some(guard))
}
