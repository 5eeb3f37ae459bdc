//! # Outbound Ports
//!
//! The feed endpoint and the set of subscriber queues links are pushed onto.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use tokio::sync::mpsc;

use crate::domain::FeedError;
use shared_types::{Address, FeedEntry};

/// Sending half of a subscriber's bounded link queue.
pub type LinkSender = mpsc::Sender<String>;

/// Paginated feed - outbound port.
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Fetch one page of entries, newest first.
    async fn fetch_page(&self, page: u32, limit: usize) -> Result<Vec<FeedEntry>, FeedError>;
}

/// Active subscriber queues - outbound port.
///
/// Implementations hand out a point-in-time copy so no lock is held while
/// the poller waits on a full queue.
pub trait LinkTargets: Send + Sync {
    /// Current subscribers and their queues.
    fn snapshot(&self) -> Vec<(Address, LinkSender)>;
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

/// Mock feed source replaying scripted pages.
///
/// Once the script runs out every request returns an empty page.
#[derive(Default)]
pub struct MockFeedSource {
    script: Mutex<VecDeque<Result<Vec<FeedEntry>, FeedError>>>,
    requests: Mutex<Vec<(u32, usize)>>,
}

impl MockFeedSource {
    /// Empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a page to return.
    pub fn push_page(&self, entries: Vec<FeedEntry>) {
        self.script.lock().push_back(Ok(entries));
    }

    /// Queue a failure.
    pub fn push_error(&self, error: FeedError) {
        self.script.lock().push_back(Err(error));
    }

    /// `(page, limit)` of every request so far.
    pub fn requests(&self) -> Vec<(u32, usize)> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl FeedSource for MockFeedSource {
    async fn fetch_page(&self, page: u32, limit: usize) -> Result<Vec<FeedEntry>, FeedError> {
        self.requests.lock().push((page, limit));
        self.script.lock().pop_front().unwrap_or_else(|| Ok(Vec::new()))
    }
}
