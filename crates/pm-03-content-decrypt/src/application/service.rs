//! # Content Service
//!
//! Fetch, decrypt and parse in one call.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, trace};

use crate::algorithms::{decrypt_content, parse_message};
use crate::domain::{ContentError, DecryptionKey};
use crate::ports::{ContentDecryptApi, ContentStore};
use shared_types::{Credential, DecryptedMessage};

/// Content Service - one instance shared by every checker.
pub struct ContentService<S: ContentStore> {
    store: Arc<S>,
}

impl<S: ContentStore> ContentService<S> {
    /// Create a new service over a content store.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<S: ContentStore + 'static> ContentDecryptApi for ContentService<S> {
    async fn fetch_message(
        &self,
        credential: &Credential,
        locator: &str,
        sent_at: DateTime<Utc>,
    ) -> Result<DecryptedMessage, ContentError> {
        let body = self.store.fetch(locator).await?;
        trace!(locator, bytes = body.len(), "[pm-03] Content fetched");

        let key = DecryptionKey::for_credential(credential, sent_at)?;
        let plaintext = decrypt_content(&key, &body)?;
        let message = parse_message(&plaintext)?;

        debug!(
            address = %credential.address(),
            identity = %key.identity(),
            key_id = %key.key_id(),
            headers = message.headers.len(),
            "[pm-03] Message decrypted"
        );
        Ok(message)
    }
}
