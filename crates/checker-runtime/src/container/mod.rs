//! # Service Container
//!
//! Configuration plus every long-lived service the runtime hands to its
//! tasks, built once at startup.

pub mod config;
pub mod services;

pub use config::{
    parse_cutoff, CheckerConfig, CheckerSettings, ConfigError, EndpointConfig, ForwarderSeed,
    LoggingSettings, SubscriptionSeed,
};
pub use services::ServiceContainer;
