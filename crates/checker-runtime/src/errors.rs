//! # Runtime Errors
//!
//! Failures of the management operations (subscribe, forwarder admin).
//! Checker and poller failures never surface here; they are logged and
//! retried inside their tasks.

use pm_01_key_derivation::KeyDerivationError;
use shared_types::{Address, ForwardError};
use thiserror::Error;

/// Management operation errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RuntimeError {
    /// The credential could not be turned into a subscription.
    #[error(transparent)]
    KeyDerivation(#[from] KeyDerivationError),

    /// A checker already runs for this address.
    #[error("Address {0} is already subscribed")]
    AlreadySubscribed(Address),

    /// No checker runs for this address.
    #[error("Address {0} is not subscribed")]
    UnknownAddress(Address),

    /// No forwarder is registered under this name.
    #[error("No forwarder named {0:?}")]
    UnknownForwarder(String),

    /// Forwarder names must contain something besides whitespace.
    #[error("Forwarder name must not be empty")]
    EmptyName,

    /// The forwarding document was rejected or a test delivery failed.
    #[error(transparent)]
    Forward(#[from] ForwardError),
}

impl RuntimeError {
    /// Short text suitable for showing to a user.
    pub fn friendly_message(&self) -> String {
        match self {
            Self::KeyDerivation(e) => e.friendly_message().to_string(),
            Self::AlreadySubscribed(_) => "You are already watching that address.".to_string(),
            Self::UnknownAddress(_) => "That address is not being watched.".to_string(),
            Self::UnknownForwarder(name) => format!("There is no forwarder called {name}."),
            Self::EmptyName => "Give the forwarder a name.".to_string(),
            Self::Forward(e) => e.to_string(),
        }
    }
}
