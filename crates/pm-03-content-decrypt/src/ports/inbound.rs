//! # Inbound Ports

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared_types::{Credential, DecryptedMessage};

use crate::domain::ContentError;

/// Content Fetch & Decrypt API - inbound port.
#[async_trait]
pub trait ContentDecryptApi: Send + Sync {
    /// Fetch the ciphertext at `locator` and decrypt it for `credential`.
    ///
    /// `sent_at` is the link timestamp; it becomes the decrypting identity's
    /// creation time.
    async fn fetch_message(
        &self,
        credential: &Credential,
        locator: &str,
        sent_at: DateTime<Utc>,
    ) -> Result<DecryptedMessage, ContentError>;
}
