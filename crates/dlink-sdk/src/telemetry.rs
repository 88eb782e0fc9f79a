//! Process-wide `tracing` subscriber setup.

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::error::{SdkError, SdkResult};

/// Install the global fmt subscriber.
///
/// `RUST_LOG` takes precedence over the configured level. Fails if a global
/// subscriber is already installed.
pub fn init(config: &LoggingConfig) -> SdkResult<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| SdkError::Telemetry(e.to_string()))?;

    let installed = if config.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .try_init()
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).try_init()
    };
    installed.map_err(|e| SdkError::Telemetry(e.to_string()))?;

    tracing::debug!(level = %config.level, json = config.json, "telemetry initialized");
    Ok(())
}
