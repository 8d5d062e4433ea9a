//! Tracing subscriber setup

use crate::config::{LogFormat, LoggingConfig};
use crate::utils::error::{GatewayError, Result};
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber
///
/// `RUST_LOG` wins over the configured level when set. A second call leaves
/// the existing subscriber in place.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = build_filter(config)?;

    let installed = match config.format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(config.with_target)
            .with_current_span(false)
            .try_init(),
        LogFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(config.with_target)
            .with_thread_ids(false)
            .try_init(),
    };

    if let Err(e) = installed {
        tracing::debug!("Logging already initialized: {}", e);
    }
    Ok(())
}

fn build_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&config.level).map_err(|e| {
            GatewayError::config(format!("Invalid log level '{}': {}", config.level, e))
        }),
    }
}
