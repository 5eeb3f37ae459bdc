//! # Benchmarks
//!
//! Criterion benchmark bodies per subsystem, registered by `benches/`.

pub mod pm_02_link_verification;
