//! # Runtime Adapters
//!
//! Implementations of PM-05's outbound ports backed by the other subsystems.

pub mod forwarder_registry;
pub mod message_fetcher;

pub use forwarder_registry::ForwarderRegistry;
pub use message_fetcher::ContentMessageFetcher;
