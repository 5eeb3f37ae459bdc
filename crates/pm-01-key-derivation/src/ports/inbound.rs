//! # Inbound Ports
//!
//! What the key derivation subsystem offers to the runtime.

use crate::domain::KeyDerivationError;
use async_trait::async_trait;
use shared_types::Credential;

/// Key Derivation API - inbound port.
#[async_trait]
pub trait KeyDerivationApi: Send + Sync {
    /// Decode a credential string, look up the counterpart key and derive
    /// everything a subscription needs.
    async fn derive_credential(&self, wif: &str) -> Result<Credential, KeyDerivationError>;
}
