//! Telemetry initialisation for the `bark-push` binary.
//!
//! Structured JSON logs only. No key material, notification content or device
//! keys are ever attached to log fields.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

/// Initialise the tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise `log_level` (from `BARK_LOG_LEVEL`) is used.
///
/// # Errors
///
/// Returns an error if the subscriber has already been set.
pub fn init(log_level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialise bark-push tracing subscriber: {e}"))
}
