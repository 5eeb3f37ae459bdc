//! # Wiring
//!
//! The supervisor that owns the poller, the checker task group and the
//! management operations.

pub mod supervisor;

pub use supervisor::CheckerRuntime;
