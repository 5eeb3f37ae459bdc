//! # Key Derivation Service
//!
//! Application service wiring WIF decoding to the key directory.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::domain::{assemble_credential, directory_bucket, DecodedWif, KeyDerivationError};
use crate::ports::{KeyDerivationApi, KeyDirectory};
use shared_types::Credential;

/// Key Derivation Service - runs once per subscribe request.
pub struct KeyDerivationService<D: KeyDirectory> {
    directory: Arc<D>,
}

impl<D: KeyDirectory> KeyDerivationService<D> {
    /// Create a new service over a key directory.
    pub fn new(directory: Arc<D>) -> Self {
        Self { directory }
    }
}

#[async_trait]
impl<D: KeyDirectory + 'static> KeyDerivationApi for KeyDerivationService<D> {
    async fn derive_credential(&self, wif: &str) -> Result<Credential, KeyDerivationError> {
        let decoded = DecodedWif::parse(wif)?;
        let bucket = directory_bucket(&decoded.public_key_bytes());
        debug!("[pm-01] Credential decoded, directory bucket {:02x}", bucket);

        let counterpart = self.directory.fetch_counterpart(bucket).await.map_err(|e| {
            warn!("[pm-01] Key directory lookup failed: {}", e);
            e
        })?;

        let credential = assemble_credential(wif, &decoded, &counterpart)?;
        info!(
            address = %credential.address(),
            currency = credential.currency().label(),
            "[pm-01] Credential derived"
        );
        Ok(credential)
    }
}
