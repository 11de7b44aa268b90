//! File logging. The terminal belongs to the UI, so nothing is written to stdout.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::project_dirs;

/// Log level comes from `ARROW_STATE_LOG`, e.g. `ARROW_STATE_LOG=debug`.
pub const LOG_ENV: &str = "ARROW_STATE_LOG";

/// Keep the returned guard alive for the lifetime of the program; dropping it flushes the writer.
pub fn init() -> Result<WorkerGuard> {
    let dir = log_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("create log dir: {}", dir.display()))?;

    let appender = tracing_appender::rolling::never(&dir, "demo.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true),
        )
        .try_init()
        .context("install tracing subscriber")?;

    tracing::info!(target: "tui", dir = %dir.display(), "logging started");
    Ok(guard)
}

fn log_dir() -> PathBuf {
    project_dirs()
        .map(|d| d.data_local_dir().join("logs"))
        .unwrap_or_else(|| PathBuf::from("."))
}
