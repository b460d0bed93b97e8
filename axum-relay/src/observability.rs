//! Tracing initialization
//!
//! The subscriber is installed once, explicitly, at startup. Nothing in the
//! dispatch path sets up logging on demand; a service that skips
//! [`init_tracing`] simply emits no events.

use tracing_subscriber::EnvFilter;

use crate::{config::Config, error::Result};

/// Install the global tracing subscriber
///
/// Emits JSON-formatted events filtered by the configured log level. Call
/// once, before the server starts accepting requests; a second call panics
/// because the global subscriber is already set.
pub fn init_tracing(config: &Config) -> Result<()> {
    let log_level = config.service.log_level.clone();

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(EnvFilter::try_new(&log_level).unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    tracing::info!("Tracing initialized for service: {}", config.service.name);

    Ok(())
}
