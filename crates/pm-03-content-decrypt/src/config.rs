//! # Content Store Configuration

use serde::{Deserialize, Serialize};

/// Default content store base URL.
pub const DEFAULT_CONTENT_URL: &str = "https://content.pubkemail.com/v1";

/// Content store configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ContentConfig {
    /// Base URL; the locator is appended as a path segment.
    pub content_url: String,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            content_url: DEFAULT_CONTENT_URL.to_string(),
            request_timeout_secs: 30,
        }
    }
}

impl ContentConfig {
    /// Full URL for a content locator.
    pub fn locator_url(&self, locator: &str) -> String {
        format!("{}/{}", self.content_url.trim_end_matches('/'), locator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locator_url() {
        assert_eq!(
            ContentConfig::default().locator_url("abc123"),
            "https://content.pubkemail.com/v1/abc123"
        );
    }
}
