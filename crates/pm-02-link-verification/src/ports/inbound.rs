//! # Inbound Ports

use crate::domain::{LinkError, LinkVerdict};
use shared_types::Credential;

/// Link Verifier API - inbound port.
///
/// Synchronous: verification is two HMACs and never touches the network.
pub trait LinkVerifierApi: Send + Sync {
    /// Parse `link` and check it against `credential`.
    fn verify_link(&self, credential: &Credential, link: &str) -> Result<LinkVerdict, LinkError>;
}
