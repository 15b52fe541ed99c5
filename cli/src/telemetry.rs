//! Tracing subscriber setup

use crate::config::ObservabilityConfig;
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is not set
#[must_use]
pub fn default_directives(level: &str) -> String {
    let level = level.to_lowercase();
    format!(
        "warn,copy_refinery={level},copy_refinery_runtime={level},copy_refinery_generators={level},copy_refinery_core={level}"
    )
}

/// Install the global subscriber
///
/// Logs go to stderr so reports written to stdout stay machine-readable.
///
/// # Errors
///
/// Returns error if the filter is invalid or a subscriber is already set
pub fn init(config: &ObservabilityConfig) -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_directives(&config.log_level))?,
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    let installed = if config.json_logs {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))
}
