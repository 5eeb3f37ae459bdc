//! # Outbound Ports
//!
//! The checker's view of content retrieval and of the forwarder registry.
//! The runtime adapts PM-03 and its forwarder map onto these.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::CheckerError;
use shared_types::{
    Address, Credential, DecryptedMessage, ForwardError, ForwardRequest, MailForwarder,
};

/// Fetch + decrypt + parse - outbound port.
#[async_trait]
pub trait MessageFetcher: Send + Sync {
    /// Retrieve the message stored under a verified content locator.
    async fn fetch_message(
        &self,
        credential: &Credential,
        locator: &str,
        sent_at: DateTime<Utc>,
    ) -> Result<DecryptedMessage, CheckerError>;
}

/// Forwarder lookup - outbound port.
///
/// Resolved per message, so reassigning a forwarder takes effect on the next
/// delivered link.
pub trait ForwarderResolver: Send + Sync {
    /// Forwarder currently assigned to `address`.
    fn resolve(&self, address: &Address) -> Option<Arc<dyn MailForwarder>>;
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

/// Mock message fetcher serving canned messages by locator.
#[derive(Default)]
pub struct MockMessageFetcher {
    messages: Mutex<HashMap<String, DecryptedMessage>>,
    calls: Mutex<Vec<String>>,
    /// Should return errors?
    pub should_fail: bool,
}

impl MockMessageFetcher {
    /// Empty fetcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetcher that fails every request.
    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    /// Serve `message` for `locator`.
    pub fn insert(&self, locator: impl Into<String>, message: DecryptedMessage) {
        self.messages.lock().insert(locator.into(), message);
    }

    /// Locators requested so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl MessageFetcher for MockMessageFetcher {
    async fn fetch_message(
        &self,
        _credential: &Credential,
        locator: &str,
        _sent_at: DateTime<Utc>,
    ) -> Result<DecryptedMessage, CheckerError> {
        self.calls.lock().push(locator.to_string());

        if self.should_fail {
            return Err(CheckerError::ContentFetch("Mock failure".to_string()));
        }

        self.messages
            .lock()
            .get(locator)
            .cloned()
            .ok_or_else(|| CheckerError::ContentFetch(format!("no content at {locator}")))
    }
}

/// Forwarder that records every request instead of delivering it.
#[derive(Default)]
pub struct RecordingForwarder {
    requests: Mutex<Vec<ForwardRequest>>,
    /// Should return errors?
    pub should_fail: bool,
}

impl RecordingForwarder {
    /// Forwarder that accepts everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Forwarder that rejects everything.
    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<ForwardRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl MailForwarder for RecordingForwarder {
    async fn forward(&self, request: ForwardRequest) -> Result<(), ForwardError> {
        self.requests.lock().push(request);
        if self.should_fail {
            return Err(ForwardError::Rejected { status: 500 });
        }
        Ok(())
    }

    fn kind(&self) -> &'static str {
        "recording"
    }
}

/// Resolver handing the same forwarder (or none) to every address.
#[derive(Default)]
pub struct StaticForwarderResolver {
    forwarder: Option<Arc<dyn MailForwarder>>,
}

impl StaticForwarderResolver {
    /// Resolve every address to `forwarder`.
    pub fn new(forwarder: Arc<dyn MailForwarder>) -> Self {
        Self {
            forwarder: Some(forwarder),
        }
    }

    /// Resolve nothing.
    pub fn empty() -> Self {
        Self::default()
    }
}

impl ForwarderResolver for StaticForwarderResolver {
    fn resolve(&self, _address: &Address) -> Option<Arc<dyn MailForwarder>> {
        self.forwarder.clone()
    }
}
