//! # PM-02 Link Verification
//!
//! Decides whether a feed link belongs to a subscription and, when it does,
//! derives the trusted content locator.
//!
//! **Subsystem ID:** 2
//! **Architecture:** Hexagonal (Domain + Ports)
//!
//! ## Two-Stage Protocol
//!
//! ```text
//! link ?check=C &hash=H &ts=T
//!         │
//!         ▼
//! HMAC(secret, "com.pubkemail.meta.v1:{addr}/{H}:{T}")  == C ?
//!         │ no ──▶ not for this address (normal outcome)
//!         │ yes
//!         ▼
//! HMAC(secret, "com.pubkemail.content.v1:{addr}/{H}:{T}") ──▶ content locator
//! ```
//!
//! The public `hash` parameter is never used to address storage. Stage 2 is
//! only computed after stage 1 matched.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algorithms;
pub mod application;
pub mod domain;
pub mod ports;

// Re-exports
pub use algorithms::{compose_link, content_tag, meta_tag, parse_link, verify};
pub use application::LinkVerifier;
pub use domain::{LinkError, LinkVerdict, VerificationOutcome};
pub use ports::LinkVerifierApi;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
