//! # Test Fixtures
//!
//! Deterministic subscribers plus helpers that play the publisher's part:
//! composing feed links and sealing mail for a subscriber.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use pm_01_key_derivation::{KeyDerivationApi, KeyDerivationService, MockKeyDirectory};
use pm_02_link_verification::{compose_link, content_tag};
use pm_03_content_decrypt::{seal_message, MockContentStore};
use shared_crypto::{encode_base58check, Secp256k1Secret};
use shared_types::{Credential, FeedEntry};

/// Base URL of composed links.
pub const LINK_BASE: &str = "https://rss.pubkemail.com/item";

/// Scalar of the key directory's counterpart key.
pub const DIRECTORY_SCALAR: u8 = 3;

/// Mainnet compressed WIF for a small scalar.
pub fn wif(scalar: u8) -> String {
    let mut payload = vec![0x80];
    let mut bytes = [0u8; 32];
    bytes[31] = scalar;
    payload.extend_from_slice(&bytes);
    payload.push(0x01);
    encode_base58check(&payload)
}

/// Uncompressed public key served by the mock directory.
pub fn directory_key() -> Vec<u8> {
    let mut bytes = [0u8; 32];
    bytes[31] = DIRECTORY_SCALAR;
    Secp256k1Secret::from_bytes(&bytes)
        .expect("valid scalar")
        .public_key_bytes(false)
}

/// Key derivation over a mock directory that serves [`directory_key`].
pub fn key_service() -> Arc<KeyDerivationService<MockKeyDirectory>> {
    Arc::new(KeyDerivationService::new(Arc::new(MockKeyDirectory::with_key(
        directory_key(),
    ))))
}

/// A subscriber as the publisher sees it.
pub struct Subscriber {
    /// Raw credential.
    pub wif: String,
    /// Derived credential.
    pub credential: Arc<Credential>,
}

impl Subscriber {
    /// Derive the subscriber for `scalar`.
    pub async fn new(scalar: u8) -> Self {
        let wif = wif(scalar);
        let credential = key_service()
            .derive_credential(&wif)
            .await
            .expect("fixture credential derives");
        Self {
            wif,
            credential: Arc::new(credential),
        }
    }

    /// Feed entry addressed to this subscriber.
    pub fn entry(&self, guid: &str, hash: &str, sent_at: DateTime<Utc>) -> FeedEntry {
        FeedEntry::new(guid, self.link(hash, sent_at))
    }

    /// Link addressed to this subscriber.
    pub fn link(&self, hash: &str, sent_at: DateTime<Utc>) -> String {
        compose_link(
            LINK_BASE,
            self.credential.shared_secret(),
            self.credential.address(),
            hash,
            nanos(sent_at),
        )
        .expect("fixture link composes")
    }

    /// Locator the verifier will derive for `hash` at `sent_at`.
    pub fn locator(&self, hash: &str, sent_at: DateTime<Utc>) -> String {
        content_tag(
            self.credential.shared_secret(),
            self.credential.address(),
            hash,
            &nanos(sent_at).to_string(),
        )
    }

    /// Seal an RFC822 message to this subscriber and store it under its locator.
    pub fn publish(
        &self,
        store: &MockContentStore,
        hash: &str,
        sent_at: DateTime<Utc>,
        subject: &str,
        body: &str,
    ) {
        let raw = format!(
            "From: alice@example.com\r\nTo: {}\r\nSubject: {subject}\r\n\r\n{body}",
            self.credential.address()
        );
        let sealed = seal_message(self.credential.public_key(), sent_at, raw.as_bytes())
            .expect("fixture message seals");
        store.insert(self.locator(hash, sent_at), sealed);
    }
}

/// Nanosecond timestamp of `at`.
pub fn nanos(at: DateTime<Utc>) -> i64 {
    at.timestamp_nanos_opt().expect("timestamp in range")
}
