//! # Outbound Ports
//!
//! The remote key directory.

use crate::domain::KeyDerivationError;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;

/// Key directory - outbound port.
///
/// Keyed by a single byte, so many local keys share one counterpart.
#[async_trait]
pub trait KeyDirectory: Send + Sync {
    /// Fetch the SEC1-encoded counterpart public key for a bucket.
    async fn fetch_counterpart(&self, bucket: u8) -> Result<Vec<u8>, KeyDerivationError>;
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

/// Mock key directory for testing.
#[derive(Default)]
pub struct MockKeyDirectory {
    /// Key returned for any bucket without an explicit entry.
    pub default_key: Option<Vec<u8>>,
    /// Per-bucket keys.
    pub keys: HashMap<u8, Vec<u8>>,
    /// Should return errors?
    pub should_fail: bool,
    requests: Mutex<Vec<u8>>,
}

impl MockKeyDirectory {
    /// Directory that answers every bucket with `key`.
    pub fn with_key(key: Vec<u8>) -> Self {
        Self {
            default_key: Some(key),
            ..Default::default()
        }
    }

    /// Directory that always fails.
    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Default::default()
        }
    }

    /// Buckets requested so far, in order.
    pub fn requests(&self) -> Vec<u8> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl KeyDirectory for MockKeyDirectory {
    async fn fetch_counterpart(&self, bucket: u8) -> Result<Vec<u8>, KeyDerivationError> {
        self.requests.lock().push(bucket);

        if self.should_fail {
            return Err(KeyDerivationError::KeyDirectory("Mock failure".to_string()));
        }

        self.keys
            .get(&bucket)
            .or(self.default_key.as_ref())
            .cloned()
            .ok_or_else(|| KeyDerivationError::KeyDirectory(format!("no key for bucket {bucket:02x}")))
    }
}
