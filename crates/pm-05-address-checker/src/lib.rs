//! # PM-05 Address Checker
//!
//! One long-lived task per subscribed address. It drains that address's link
//! queue in arrival order and runs every link through verify, freshness,
//! decrypt, count and forward.
//!
//! **Subsystem ID:** 5
//! **Architecture:** Hexagonal (Domain + Ports)
//!
//! ## State Machine
//!
//! ```text
//!            ┌──────────────────────────────────────────────────────┐
//!            ▼                                                      │
//!       ┌─────────┐  link   ┌───────────┐ match+fresh ┌────────────┐ │
//!  ───▶ │ Waiting │───────▶ │ Verifying │───────────▶ │ Decrypting │ │
//!       └─────────┘         └───────────┘             └────────────┘ │
//!            │                 │ no match / stale          │ ok      │
//!   shutdown │                 │ / malformed               ▼         │
//!   or queue │                 │                   ┌─────────────┐   │
//!   closed   │                 │                   │ Dispatching │   │
//!            ▼                 ▼                   └─────────────┘   │
//!       ┌─────────┐       ┌─────────┐ ◀───────────────────┘          │
//!       │ Stopped │       │ Backoff │ ───────── sleep ───────────────┘
//!       └─────────┘       └─────────┘
//! ```
//!
//! Errors never end the loop. Only the shutdown signal or a closed queue do.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

// Re-exports
pub use application::{AddressChecker, CheckerContext};
pub use config::AddressCheckerConfig;
pub use domain::{CheckerError, CheckerReport, CheckerState, FreshnessCutoff, LinkOutcome};
pub use ports::{
    ForwarderResolver, MessageFetcher, MockMessageFetcher, RecordingForwarder,
    StaticForwarderResolver,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
