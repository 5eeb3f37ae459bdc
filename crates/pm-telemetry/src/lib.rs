//! # Pubkey-Mail Telemetry
//!
//! Logging and metrics for the checker.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pm_telemetry::{init_telemetry, TelemetryConfig};
//!
//! let _guard = init_telemetry(TelemetryConfig::from_env())?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `PM_LOG_LEVEL` / `RUST_LOG` | `info` | Log level filter |
//! | `PM_JSON_LOGS` | `false` | JSON formatted logs |
//! | `PM_SERVICE_NAME` | `pm-checker` | Service name in the startup line |

#![warn(missing_docs)]

mod config;
mod logging;
pub mod metrics;

pub use config::TelemetryConfig;
pub use metrics::{
    encode_metrics, register_metrics, CONTENT_FAILURES, FEED_PAGES, FEED_RESETS,
    FORWARD_FAILURES, LINKS_CHECKED, LINKS_MATCHED, MESSAGES_FORWARDED, RESET_REASONS,
};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// The global subscriber could not be installed.
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    /// A metric could not be registered or encoded.
    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),
}

/// Install logging and register metrics.
///
/// The returned guard logs when it is dropped; hold it for the lifetime of
/// the process.
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    register_metrics()?;
    logging::init_logging(&config)?;

    tracing::info!(
        service = %config.service_name,
        json = config.json_logs,
        "Telemetry initialized"
    );

    Ok(TelemetryGuard {
        service_name: config.service_name,
    })
}

/// Guard that keeps telemetry active.
pub struct TelemetryGuard {
    service_name: String,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!(service = %self.service_name, "Shutting down telemetry...");
    }
}

/// Convenience macro for recording a metric increment.
#[macro_export]
macro_rules! metric_inc {
    ($metric:expr) => {
        $metric.inc()
    };
    ($metric:expr, $labels:expr) => {
        $metric.with_label_values($labels).inc()
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = TelemetryConfig::default();
        assert_eq!(config.service_name, "pm-checker");
    }

    #[test]
    fn test_metric_inc_macro() {
        let before = FEED_PAGES.get();
        metric_inc!(FEED_PAGES);
        assert!(FEED_PAGES.get() >= before + 1.0);

        let genesis = FEED_RESETS.with_label_values(&["genesis"]).get();
        metric_inc!(FEED_RESETS, &["genesis"]);
        assert!(FEED_RESETS.with_label_values(&["genesis"]).get() >= genesis + 1.0);
    }
}
