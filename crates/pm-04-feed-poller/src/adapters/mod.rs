//! # Adapters

pub mod queue_registry;
pub mod rss_feed;

pub use queue_registry::QueueRegistry;
pub use rss_feed::{parse_feed, HttpFeedSource};
