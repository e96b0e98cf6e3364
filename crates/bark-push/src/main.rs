//! `bark-push`: send one notification from the command line.
//!
//! Startup sequence:
//! 1. Load and validate [`Config`](config::Config) from `BARK_*` environment variables.
//! 2. Initialise structured JSON logging.
//! 3. Build the request and push it; exit non-zero on failure.

mod config;
mod telemetry;

use std::time::Duration;

use anyhow::{Context, Result};
use bark::{Client, HyperTransport};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // -----------------------------------------------------------------------
    // 1. Configuration
    // -----------------------------------------------------------------------
    let cfg = config::Config::from_env().map_err(|e| {
        // Telemetry is not yet up; write to stderr directly.
        eprintln!("ERROR: bark-push configuration invalid: {e:#}");
        e
    })?;

    // -----------------------------------------------------------------------
    // 2. Telemetry
    // -----------------------------------------------------------------------
    telemetry::init(&cfg.log_level)?;

    // -----------------------------------------------------------------------
    // 3. Push
    // -----------------------------------------------------------------------
    let transport = HyperTransport::with_timeout(Duration::from_secs(cfg.timeout_secs));
    let client = Client::with_transport(&cfg.server_url, transport);
    let request = cfg.to_request();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        server = %client.server_url(),
        encrypted = request.enc.is_some(),
        "bark-push sending"
    );

    client.push(&request).await.context("push failed")?;
    info!("notification delivered");
    Ok(())
}
