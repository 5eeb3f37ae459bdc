//! # Checker Runtime
//!
//! Wires the subsystems into a running checker: one feed poller, one checker
//! task per subscribed address, a forwarder registry and the management
//! operations used by front ends.
//!
//! **Architecture:** the container builds every service once; the
//! supervisor owns the tasks and the shutdown signal.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                     CheckerRuntime                         │
//! │  subscribe / unsubscribe / add_forwarder / status_lines    │
//! ├──────────────────────────┬─────────────────────────────────┤
//! │  ServiceContainer        │  Tasks                          │
//! │  PM-01 key derivation    │  FeedPoller (PM-04)             │
//! │  PM-02 link verifier     │  AddressChecker × N (PM-05)     │
//! │  PM-03 content decrypt   │  MetricsHandler                 │
//! │  ForwarderRegistry       │                                 │
//! └──────────────────────────┴─────────────────────────────────┘
//! ```
//!
//! The `pm-checker` binary in `main.rs` is a thin shell over this library.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod container;
pub mod errors;
pub mod handlers;
pub mod wiring;

// Re-exports
pub use adapters::{ContentMessageFetcher, ForwarderRegistry};
pub use container::{parse_cutoff, CheckerConfig, ConfigError, ServiceContainer};
pub use errors::RuntimeError;
pub use handlers::MetricsHandler;
pub use wiring::CheckerRuntime;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
