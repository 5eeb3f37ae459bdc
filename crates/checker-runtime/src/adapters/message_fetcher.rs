//! # Message Fetcher Adapter
//!
//! Connects the checker's `MessageFetcher` port to the content subsystem.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

use pm_03_content_decrypt::{ContentDecryptApi, ContentError};
use pm_05_address_checker::{CheckerError, MessageFetcher};
use shared_types::{Credential, DecryptedMessage};

/// Adapter that forwards checker fetches to PM-03.
pub struct ContentMessageFetcher<C: ContentDecryptApi + ?Sized> {
    content: Arc<C>,
}

impl<C: ContentDecryptApi + ?Sized> ContentMessageFetcher<C> {
    /// Wrap a content service.
    pub fn new(content: Arc<C>) -> Self {
        Self { content }
    }
}

#[async_trait]
impl<C: ContentDecryptApi + ?Sized + 'static> MessageFetcher for ContentMessageFetcher<C> {
    async fn fetch_message(
        &self,
        credential: &Credential,
        locator: &str,
        sent_at: DateTime<Utc>,
    ) -> Result<DecryptedMessage, CheckerError> {
        self.content
            .fetch_message(credential, locator, sent_at)
            .await
            .map_err(|e| match e {
                ContentError::ContentFetch(detail) => CheckerError::ContentFetch(detail),
                ContentError::MessageDecode(detail) => CheckerError::MessageDecode(detail),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pm_03_content_decrypt::{ContentService, MockContentStore};
    use shared_types::{Address, CredentialParts, CurrencyTag, SharedSecret};

    fn credential() -> Credential {
        Credential::from_parts(CredentialParts {
            wif: "5Hwif".into(),
            secret_scalar: [7u8; 32],
            public_key: vec![2u8; 33],
            address: Address::new("mtest"),
            currency: CurrencyTag::Btc,
            shared_secret: SharedSecret::new(vec![4u8; 65]),
        })
    }

    #[tokio::test]
    async fn test_missing_content_maps_to_fetch_error() {
        let store = Arc::new(MockContentStore::new());
        let fetcher = ContentMessageFetcher::new(Arc::new(ContentService::new(store.clone())));

        let err = fetcher
            .fetch_message(&credential(), "abc123", Utc::now())
            .await
            .unwrap_err();

        assert!(matches!(err, CheckerError::ContentFetch(_)));
        assert_eq!(store.fetches(), vec!["abc123".to_string()]);
    }

    #[tokio::test]
    async fn test_garbage_content_maps_to_decode_error() {
        let store = Arc::new(MockContentStore::new());
        store.insert("abc123", "bm90IGFuIGVudmVsb3Bl");
        let fetcher = ContentMessageFetcher::new(Arc::new(ContentService::new(store)));

        let err = fetcher
            .fetch_message(&credential(), "abc123", Utc::now())
            .await
            .unwrap_err();

        assert!(matches!(err, CheckerError::MessageDecode(_)));
    }
}
