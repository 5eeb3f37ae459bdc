//! # PM-04 Feed Poller
//!
//! Reads the shared notification feed page by page and pushes every link onto
//! the inbound queue of each active subscription.
//!
//! **Subsystem ID:** 4
//! **Architecture:** Hexagonal (Domain + Ports/Adapters)
//!
//! ## Poll Cycle
//!
//! ```text
//!              ┌──── no subscribers ────▶ sleep idle ─────┐
//!              │                                          │
//! tick() ──────┼──── fetch error ───────▶ reset, sleep reset
//!              │                                          │
//!              ├──── empty page ────────▶ reset, sleep idle
//!              │                                          │
//!              ├──── genesis item ──────▶ reset, sleep reset + page
//!              │                                          │
//!              └──── full page ─────────▶ fan-out, cursor += 1, sleep page
//! ```
//!
//! ## Backpressure
//!
//! Fan-out awaits each bounded queue in turn. A saturated subscriber holds
//! the poller on the current page until it drains.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

// Re-exports
pub use adapters::{HttpFeedSource, QueueRegistry};
pub use application::FeedPoller;
pub use config::PollerConfig;
pub use domain::{FeedError, PageCursor, TickOutcome};
pub use ports::{FeedPollerApi, FeedSource, LinkSender, LinkTargets, MockFeedSource};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
