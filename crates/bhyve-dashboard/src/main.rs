//! B-Hyve Dashboard server.
//!
//! Signs in to the Orbit B-Hyve cloud once and proxies a small set of device
//! operations to the local dashboard page.

use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use bhyve_core::{ApiClient, Config, Dashboard};
use bhyve_dashboard::{start_server, AppState};

/// Log file name prefix inside the configured log directory
const LOG_FILE_PREFIX: &str = "bhyve-dashboard.log";

/// Initialize the tracing subscriber for logging.
///
/// Returns the file writer guard when file logging is enabled; it must live
/// until the process exits so buffered lines are flushed.
fn init_tracing(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt::layer().with_writer(writer).with_ansi(false)), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = Config::load().context("Failed to load configuration")?;
    let _log_guard = init_tracing(config.log_dir.as_deref());
    info!(version = env!("CARGO_PKG_VERSION"), "B-Hyve Dashboard starting");
    info!(api = %config.api_base_url, static_dir = %config.static_dir.display(), "Configuration loaded");

    let api = ApiClient::with_base_url(&config.api_base_url, config.request_timeout())
        .context("Failed to build HTTP client")?;
    let state = AppState::new(Dashboard::new(api));

    start_server(&config, state).await?;

    info!("B-Hyve Dashboard shutting down");
    Ok(())
}
