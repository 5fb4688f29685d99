//! Structured logging infrastructure for the regdomain controller.
//!
//! Log level can be configured via the `RUST_LOG` environment variable.
//! If not set, defaults to `info` level.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initialize the logging system with human readable output.
///
/// # Example
/// ```no_run
/// use regdomain_core::logging;
///
/// logging::init();
/// tracing::info!("Controller started");
/// ```
pub fn init() {
    tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .init();
}

/// Initialize the logging system with JSON output for log aggregation.
pub fn init_json() {
    tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt::layer().json().with_target(true).with_thread_ids(true))
        .init();
}

/// Pick the output format from the `[logging]` config section.
pub fn init_from_config(config: &LoggingConfig) {
    if config.json {
        init_json();
    } else {
        init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_filter_doesnt_panic() {
        // Subscribers can only be installed once per process, so only the filter is built here.
        let _ = env_filter();
    }
}
