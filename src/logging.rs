//! File-only tracing setup; the TUI owns the terminal, so nothing goes to
//! stdout or stderr.

use std::{fs, path::PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

pub fn log_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("rnovel").join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"))
}

/// Installs the global subscriber. Keep the returned guard alive until exit
/// so buffered lines get flushed.
pub fn init_tui() -> WorkerGuard {
    let log_dir = log_dir();
    if let Err(e) = fs::create_dir_all(&log_dir) {
        eprintln!("Failed to create logs directory: {}", e);
    }

    let file_appender = tracing_appender::rolling::daily(&log_dir, "rnovel.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .json()
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .with_filter(env_filter);

    if let Err(e) = tracing_subscriber::registry().with(file_layer).try_init() {
        eprintln!("Failed to initialize logging: {}", e);
    }

    tracing::info!(dir = %log_dir.display(), "logging initialized");
    guard
}
