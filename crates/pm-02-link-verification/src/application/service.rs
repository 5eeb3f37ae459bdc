//! # Link Verifier Service

use tracing::trace;

use crate::algorithms::{parse_link, verify};
use crate::domain::{LinkError, LinkVerdict};
use crate::ports::LinkVerifierApi;
use shared_types::Credential;

/// Stateless verifier over a credential's shared secret.
#[derive(Debug, Default, Clone, Copy)]
pub struct LinkVerifier;

impl LinkVerifier {
    /// Create a verifier.
    pub fn new() -> Self {
        Self
    }
}

impl LinkVerifierApi for LinkVerifier {
    fn verify_link(&self, credential: &Credential, link: &str) -> Result<LinkVerdict, LinkError> {
        let params = parse_link(link)?;
        let outcome = verify(
            credential.shared_secret(),
            credential.address(),
            &params.check,
            &params.hash,
            &params.ts,
        );
        trace!(
            address = %credential.address(),
            matched = outcome.matched,
            "[pm-02] Link verified"
        );
        Ok(LinkVerdict { params, outcome })
    }
}
