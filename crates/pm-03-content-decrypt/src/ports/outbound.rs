//! # Outbound Ports
//!
//! The content-addressed storage service.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;

use crate::domain::ContentError;

/// Content store - outbound port.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Fetch the raw response body (base64 text) stored at `locator`.
    async fn fetch(&self, locator: &str) -> Result<Vec<u8>, ContentError>;
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

/// Mock content store for testing.
#[derive(Default)]
pub struct MockContentStore {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
    fetches: Mutex<Vec<String>>,
    /// Should return errors?
    pub should_fail: bool,
}

impl MockContentStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `body` under `locator`.
    pub fn insert(&self, locator: impl Into<String>, body: impl Into<Vec<u8>>) {
        self.blobs.lock().insert(locator.into(), body.into());
    }

    /// Locators fetched so far, in order.
    pub fn fetches(&self) -> Vec<String> {
        self.fetches.lock().clone()
    }
}

#[async_trait]
impl ContentStore for MockContentStore {
    async fn fetch(&self, locator: &str) -> Result<Vec<u8>, ContentError> {
        self.fetches.lock().push(locator.to_string());

        if self.should_fail {
            return Err(ContentError::ContentFetch("Mock failure".to_string()));
        }

        self.blobs
            .lock()
            .get(locator)
            .cloned()
            .ok_or_else(|| ContentError::ContentFetch(format!("HTTP from {locator} status: 404 Not Found")))
    }
}
