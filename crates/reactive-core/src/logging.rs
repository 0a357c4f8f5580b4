//! Tracing subscriber setup
//!
//! The library only emits `tracing` events. Binaries and tests that want to
//! see them install a subscriber with [`init_logging`].

use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, LoggingConfig};
use crate::error::{ReactiveError, ReactiveResult};

/// Install a global `fmt` subscriber.
///
/// `RUST_LOG` takes precedence over `config.level` when set. Fails if a
/// global subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> ReactiveResult<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| ReactiveError::config(format!("Invalid log level: {}", e)))?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let result = match config.format {
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };

    result.map_err(|e| ReactiveError::config(format!("Failed to install subscriber: {}", e)))
}
