//! Where logs go and how loud they are.

use std::env;

const SERVICE_NAME: &str = "pm-checker";
const DEFAULT_LEVEL: &str = "info";

/// Logging settings, resolved before the subscriber is installed.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Name printed on the startup line.
    pub service_name: String,
    /// An `EnvFilter` directive such as `info` or `pm_04_feed_poller=debug,warn`.
    pub log_level: String,
    /// One JSON object per line instead of human-readable output.
    pub json_logs: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: SERVICE_NAME.to_string(),
            log_level: DEFAULT_LEVEL.to_string(),
            json_logs: false,
        }
    }
}

impl TelemetryConfig {
    /// Read `PM_SERVICE_NAME`, `PM_LOG_LEVEL` (falling back to `RUST_LOG`)
    /// and `PM_JSON_LOGS` from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) over an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(name) = lookup("PM_SERVICE_NAME") {
            config.service_name = name;
        }
        if let Some(level) = lookup("PM_LOG_LEVEL").or_else(|| lookup("RUST_LOG")) {
            config.log_level = level;
        }
        if let Some(flag) = lookup("PM_JSON_LOGS") {
            config.json_logs = parse_flag(&flag);
        }
        config
    }

    /// Replace the filter directive.
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Switch JSON output on or off.
    pub fn with_json_logs(mut self, json: bool) -> Self {
        self.json_logs = json;
        self
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes")
}
