//! `tracing` subscriber bootstrap.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, reload};

use crate::config::LoggingConfig;
use crate::error::{CoreError, CoreResult};

/// Handle used to swap the active filter once settings are known.
pub type FilterHandle = reload::Handle<EnvFilter, tracing_subscriber::Registry>;

/// ## Summary
/// Installs the global subscriber with a `debug` filter that can be reloaded later.
/// Output goes to stderr so stdout stays free for command output.
///
/// Records emitted through the `log` facade are forwarded into `tracing`.
///
/// ## Errors
/// Returns an error if a global subscriber is already installed.
pub fn init_tracing() -> CoreResult<FilterHandle> {
    let (filter_layer, filter_handle) = reload::Layer::new(EnvFilter::new("debug"));

    tracing_log::LogTracer::init().map_err(|e| CoreError::ConfigError(e.to_string()))?;

    let subscriber = tracing_subscriber::registry().with(filter_layer).with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true),
    );
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| CoreError::ConfigError(e.to_string()))?;

    Ok(filter_handle)
}

/// ## Summary
/// Applies the configured log level, keeping the current filter if it is invalid.
pub fn apply_logging_config(handle: &FilterHandle, logging: &LoggingConfig) {
    if let Ok(filter) = EnvFilter::try_new(logging.level.as_str()) {
        if let Err(e) = handle.modify(|current| *current = filter) {
            tracing::warn!(error = %e, "Failed to update log filter from config");
        }
    } else {
        tracing::warn!(level = %logging.level, "Invalid log level in config, keeping debug");
    }
}
