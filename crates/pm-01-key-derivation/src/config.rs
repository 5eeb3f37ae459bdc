//! # Key Derivation Configuration

use serde::{Deserialize, Serialize};

/// Default key directory base URL.
pub const DEFAULT_DIRECTORY_URL: &str = "http://shared.pubkemail.com/public/key";

/// Key derivation configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KeyDerivationConfig {
    /// Base URL of the key directory; the bucket is appended as a path segment.
    pub directory_url: String,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for KeyDerivationConfig {
    fn default() -> Self {
        Self {
            directory_url: DEFAULT_DIRECTORY_URL.to_string(),
            request_timeout_secs: 30,
        }
    }
}

impl KeyDerivationConfig {
    /// Full lookup URL for a bucket.
    pub fn bucket_url(&self, bucket: u8) -> String {
        format!("{}/{:02x}", self.directory_url.trim_end_matches('/'), bucket)
    }
}
