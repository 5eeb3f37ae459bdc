//! # Event Handlers
//!
//! Tasks that consume the shared event bus.

pub mod metrics;

pub use metrics::MetricsHandler;
