//! # Domain Errors

use thiserror::Error;

/// Feed errors. Never fatal: the poller resets and tries again later.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FeedError {
    /// Transport failure or a non-200 response.
    #[error("Feed fetch failed: {0}")]
    FeedFetch(String),

    /// The response was not a syndication feed.
    #[error("Feed parse failed: {0}")]
    FeedParse(String),
}
