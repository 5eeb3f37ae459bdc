//! # Checker Configuration
//!
//! Unified configuration for every subsystem and for the runtime itself.
//!
//! ## Precedence (lowest first)
//!
//! 1. Built-in defaults
//! 2. TOML file (`--config`)
//! 3. `PM_*` environment variables
//! 4. Command-line flags

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

use pm_01_key_derivation::{config::DEFAULT_DIRECTORY_URL, KeyDerivationConfig};
use pm_03_content_decrypt::{config::DEFAULT_CONTENT_URL, ContentConfig};
use pm_04_feed_poller::PollerConfig;
use pm_05_address_checker::AddressCheckerConfig;

/// Complete checker configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckerConfig {
    /// Remote services.
    pub endpoints: EndpointConfig,
    /// Feed polling.
    pub poller: PollerConfig,
    /// Per-address checkers.
    pub checker: CheckerSettings,
    /// Log output.
    pub logging: LoggingSettings,
    /// Credentials to subscribe at startup.
    pub subscriptions: Vec<SubscriptionSeed>,
    /// Forwarders to register at startup.
    pub forwarders: Vec<ForwarderSeed>,
}

/// Key directory and content store locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    /// Key directory base URL.
    pub directory_url: String,
    /// Content store base URL.
    pub content_url: String,
    /// HTTP timeout for both, in seconds.
    pub request_timeout_secs: u64,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            directory_url: DEFAULT_DIRECTORY_URL.to_string(),
            content_url: DEFAULT_CONTENT_URL.to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Checker task settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckerSettings {
    /// Links buffered per address before the poller blocks.
    pub queue_capacity: usize,
    /// Sleep after every processed link.
    pub backoff_secs: u64,
    /// Only forward mail sent after this date (see [`parse_cutoff`]).
    pub after: Option<String>,
    /// How long shutdown waits for checkers to finish.
    pub shutdown_grace_secs: u64,
}

impl Default for CheckerSettings {
    fn default() -> Self {
        Self {
            queue_capacity: 250,
            backoff_secs: 10,
            after: None,
            shutdown_grace_secs: 5,
        }
    }
}

/// Log settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Filter directive.
    pub level: String,
    /// JSON output.
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// A credential to subscribe at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionSeed {
    /// Base58check private key.
    pub wif: String,
    /// Forwarder name; any registered forwarder when absent.
    #[serde(default)]
    pub forward_to: Option<String>,
}

/// A forwarder to register at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForwarderSeed {
    /// Display name.
    pub name: String,
    /// Forwarding document.
    pub json: String,
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("Cannot read config file {path}: {source}")]
    Read {
        /// File path.
        path: String,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The file is not valid TOML for this schema.
    #[error("Invalid config file: {0}")]
    Parse(String),

    /// A value is out of range.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl CheckerConfig {
    /// Parse a TOML document over the defaults.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Read and parse a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Apply `PM_*` overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply `PM_*` overrides from any lookup function.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("PM_FEED_URL") {
            self.poller.feed_url = url;
        }
        if let Some(url) = lookup("PM_CONTENT_URL") {
            self.endpoints.content_url = url;
        }
        if let Some(url) = lookup("PM_DIRECTORY_URL") {
            self.endpoints.directory_url = url;
        }
        if let Some(after) = lookup("PM_AFTER") {
            self.checker.after = Some(after);
        }
        if let Some(level) = lookup("PM_LOG_LEVEL").or_else(|| lookup("RUST_LOG")) {
            self.logging.level = level;
        }
        if let Some(json) = lookup("PM_JSON_LOGS") {
            self.logging.json = matches!(json.to_ascii_lowercase().as_str(), "1" | "true" | "yes");
        }
        if let Some(size) = lookup("PM_PAGE_SIZE") {
            match size.parse() {
                Ok(size) => self.poller.page_size = size,
                Err(_) => warn!("PM_PAGE_SIZE must be a positive integer"),
            }
        }
        if let Some(capacity) = lookup("PM_QUEUE_CAPACITY") {
            match capacity.parse() {
                Ok(capacity) => self.checker.queue_capacity = capacity,
                Err(_) => warn!("PM_QUEUE_CAPACITY must be a positive integer"),
            }
        }
    }

    /// Reject values the runtime cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poller.page_size == 0 {
            return Err(ConfigError::Invalid("poller.page_size must be > 0".into()));
        }
        if self.checker.queue_capacity == 0 {
            return Err(ConfigError::Invalid("checker.queue_capacity must be > 0".into()));
        }
        for (name, url) in [
            ("poller.feed_url", &self.poller.feed_url),
            ("endpoints.content_url", &self.endpoints.content_url),
            ("endpoints.directory_url", &self.endpoints.directory_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::Invalid(format!("{name} must be an http(s) URL")));
            }
        }
        for seed in &self.forwarders {
            if seed.name.trim().is_empty() {
                return Err(ConfigError::Invalid("forwarder name must not be empty".into()));
            }
        }
        Ok(())
    }

    /// Key derivation settings.
    pub fn key_derivation(&self) -> KeyDerivationConfig {
        KeyDerivationConfig {
            directory_url: self.endpoints.directory_url.clone(),
            request_timeout_secs: self.endpoints.request_timeout_secs,
        }
    }

    /// Content store settings.
    pub fn content(&self) -> ContentConfig {
        ContentConfig {
            content_url: self.endpoints.content_url.clone(),
            request_timeout_secs: self.endpoints.request_timeout_secs,
        }
    }

    /// Address checker settings, with the cutoff resolved.
    pub fn address_checker(&self) -> AddressCheckerConfig {
        let after = self.checker.after.as_deref().and_then(|raw| {
            let parsed = parse_cutoff(raw);
            match parsed {
                Some(at) => info!(after = %at, "Forwarding only mail sent after cutoff"),
                None if !raw.trim().is_empty() => warn!(raw, "Unrecognised cutoff date, ignoring"),
                None => {}
            }
            parsed
        });
        AddressCheckerConfig {
            backoff_secs: self.checker.backoff_secs,
            after,
        }
    }
}

/// Parse a cutoff date.
///
/// Accepts RFC 3339, `YYYY-MM-DDTHH:MM:SS` with an optional ` UTC`/` GMT`
/// suffix, or a bare `YYYY-MM-DD` (midnight UTC). Anything else is `None`.
pub fn parse_cutoff(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Some(at.with_timezone(&Utc));
    }

    let naive = raw
        .strip_suffix(" UTC")
        .or_else(|| raw.strip_suffix(" GMT"))
        .unwrap_or(raw);
    if let Ok(at) = NaiveDateTime::parse_from_str(naive, "%Y-%m-%dT%H:%M:%S") {
        return Some(at.and_utc());
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|at| at.and_utc())
}
