//! # Poller Configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default feed endpoint.
pub const DEFAULT_FEED_URL: &str = "https://rss.pubkemail.com/feed";

/// Items requested per page.
pub const DEFAULT_PAGE_SIZE: usize = 250;

/// Feed poller configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PollerConfig {
    /// Paginated feed endpoint.
    pub feed_url: String,

    /// `limit` query parameter.
    pub page_size: usize,

    /// Sleep when there is nothing to do (no subscribers, empty page).
    pub idle_interval_secs: u64,

    /// Sleep after a page has been fanned out.
    pub page_interval_secs: u64,

    /// Sleep after a fetch failure. The genesis marker sleeps this plus the
    /// page interval.
    pub reset_interval_secs: u64,

    /// HTTP request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            feed_url: DEFAULT_FEED_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            idle_interval_secs: 5,
            page_interval_secs: 10,
            reset_interval_secs: 65,
            request_timeout_secs: 30,
        }
    }
}

impl PollerConfig {
    /// Idle interval.
    pub fn idle_interval(&self) -> Duration {
        Duration::from_secs(self.idle_interval_secs)
    }

    /// Interval between pages.
    pub fn page_interval(&self) -> Duration {
        Duration::from_secs(self.page_interval_secs)
    }

    /// Long backoff after a reset.
    pub fn reset_interval(&self) -> Duration {
        Duration::from_secs(self.reset_interval_secs)
    }
}
