//! # Shared Types Crate
//!
//! This crate contains the domain entities every subsystem agrees on and the
//! outbound forwarding port that delivers decrypted mail.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All cross-subsystem types are defined here.
//! - **Immutable Credentials**: A `Credential` is built once at subscription
//!   time and never mutated; the shared secret it carries is never recomputed.
//! - **Counted, not shared**: The unread counters are the only mutable state
//!   shared between tasks, and every mutation goes through a lock.

pub mod counters;
pub mod entities;
pub mod errors;
pub mod forwarding;

pub use counters::UnreadCounters;
pub use entities::*;
pub use errors::*;
pub use forwarding::{ForwardRequest, MailForwarder};
