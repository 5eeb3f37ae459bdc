//! # Error Types
//!
//! Errors shared across subsystems. Subsystem-specific failures live in each
//! subsystem's own `domain/errors.rs`.

use thiserror::Error;

/// Errors raised by a forwarding capability.
///
/// Forwarding failures are logged by the address checker and never retried.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ForwardError {
    /// The forwarding configuration could not be used.
    #[error("Invalid forwarding configuration: {0}")]
    InvalidConfig(String),

    /// A header or parameter template failed to render.
    #[error("Template error: {0}")]
    Template(String),

    /// A mail address could not be parsed.
    #[error("Invalid mail address: {0}")]
    InvalidAddress(String),

    /// The relay or endpoint could not be reached.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The remote side answered with a non-success status.
    #[error("Rejected by remote: status {status}")]
    Rejected {
        /// Status code returned by the remote side.
        status: u16,
    },
}
