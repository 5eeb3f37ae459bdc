//! # Integration Tests
//!
//! Cross-subsystem scenarios: a feed page goes in, forwarded mail and
//! counters come out.

pub mod e2e_pipeline;
pub mod runtime_flows;
