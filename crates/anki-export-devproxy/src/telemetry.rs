//! Logging init: structured `tracing` output on stderr.
//!
//! The filter comes from `RUST_LOG` when set, otherwise
//! [`DEFAULT_FILTER`], which includes the request spans of the HTTP
//! trace layer and one line per forwarded request with its upstream
//! status.

use tracing_subscriber::EnvFilter;

pub const DEFAULT_FILTER: &str = "info,anki_export_devproxy=debug,tower_http=debug";

/// Install the global subscriber.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_logging() -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialize logging: {e}"))?;

    Ok(())
}
