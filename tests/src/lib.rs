//! # Pubkey-Mail Checker Test Suite
//!
//! Unified test crate containing:
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── fixtures.rs       # Subscribers, links and sealed mail
//! ├── benchmarks/       # Criterion benchmark bodies per subsystem
//! │   └── pm_02_link_verification.rs
//! │
//! └── integration/      # Feed → checker → forwarder scenarios
//!     ├── e2e_pipeline.rs
//!     └── runtime_flows.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p pm-tests
//!
//! # By category
//! cargo test -p pm-tests integration::
//!
//! # Benchmarks
//! cargo bench -p pm-tests
//! ```

pub mod benchmarks;
pub mod fixtures;
pub mod integration;
