//! # Core Domain Entities
//!
//! ## Clusters
//!
//! - **Identity**: `Address`, `CurrencyTag`, `Credential`, `SharedSecret`
//! - **Feed**: `FeedEntry`, `LinkParams`
//! - **Mail**: `MailHeaders`, `DecryptedMessage`

use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::Zeroizing;

// =============================================================================
// CLUSTER A: IDENTITY
// =============================================================================

/// A base58check network address derived from a credential.
///
/// The address string is an input to both keyed-hash stages, so it is kept
/// exactly as derived and never normalised.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Address(String);

impl Address {
    /// Wrap an already-encoded address string.
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// The encoded address.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Address {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Currency family, selected from the credential's version byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyTag {
    /// Bitcoin mainnet (`0x80`).
    Btc,
    /// Litecoin (`0xB0`).
    Ltc,
    /// Dogecoin (`0x9E`).
    Doge,
    /// Any testnet (`0xEF`, `0xF1`).
    Testnet,
    /// Unrecognised version byte. Not an error.
    #[default]
    Unknown,
}

impl CurrencyTag {
    /// Classify a WIF version byte.
    pub fn from_version_byte(version: u8) -> Self {
        match version {
            0x80 => CurrencyTag::Btc,
            0xB0 => CurrencyTag::Ltc,
            0x9E => CurrencyTag::Doge,
            0xEF | 0xF1 => CurrencyTag::Testnet,
            _ => CurrencyTag::Unknown,
        }
    }

    /// Short display label; empty for unknown currencies.
    pub fn label(&self) -> &'static str {
        match self {
            CurrencyTag::Btc => "BTC",
            CurrencyTag::Ltc => "LTC",
            CurrencyTag::Doge => "XDG",
            CurrencyTag::Testnet => "-T-",
            CurrencyTag::Unknown => "",
        }
    }
}

impl fmt::Display for CurrencyTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// ECDH-derived secret used as the HMAC key for every link of one address.
#[derive(Clone, PartialEq, Eq)]
pub struct SharedSecret(Zeroizing<Vec<u8>>);

impl SharedSecret {
    /// Wrap the canonical point encoding produced by key agreement.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(Zeroizing::new(bytes))
    }

    /// Raw secret bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SharedSecret(<{} bytes redacted>)", self.0.len())
    }
}

/// The raw parts a key-derivation engine hands over to build a `Credential`.
pub struct CredentialParts {
    /// The credential string as submitted.
    pub wif: String,
    /// The 32-byte private scalar.
    pub secret_scalar: [u8; 32],
    /// Serialised public key (33 bytes compressed or 65 uncompressed).
    pub public_key: Vec<u8>,
    /// Derived network address.
    pub address: Address,
    /// Currency classification.
    pub currency: CurrencyTag,
    /// Shared secret with the directory counterpart key.
    pub shared_secret: SharedSecret,
}

/// Decoded private-key material plus everything derived from it.
///
/// ## Invariant
///
/// Created exactly once per subscription and immutable afterwards: there are
/// no setters, and the shared secret is never recomputed.
#[derive(Clone)]
pub struct Credential {
    wif: Zeroizing<String>,
    secret_scalar: Zeroizing<[u8; 32]>,
    public_key: Vec<u8>,
    address: Address,
    currency: CurrencyTag,
    shared_secret: SharedSecret,
}

impl Credential {
    /// Assemble a credential from fully derived parts.
    pub fn from_parts(parts: CredentialParts) -> Self {
        Self {
            wif: Zeroizing::new(parts.wif),
            secret_scalar: Zeroizing::new(parts.secret_scalar),
            public_key: parts.public_key,
            address: parts.address,
            currency: parts.currency,
            shared_secret: parts.shared_secret,
        }
    }

    /// The derived address.
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Currency classification.
    pub fn currency(&self) -> CurrencyTag {
        self.currency
    }

    /// Serialised public key.
    pub fn public_key(&self) -> &[u8] {
        &self.public_key
    }

    /// Private scalar, big-endian.
    pub fn secret_scalar(&self) -> &[u8; 32] {
        &self.secret_scalar
    }

    /// Shared secret used for link verification.
    pub fn shared_secret(&self) -> &SharedSecret {
        &self.shared_secret
    }

    /// The credential string cut down for display.
    pub fn truncated_wif(&self, length: usize) -> String {
        truncate_text(&self.wif, length)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("address", &self.address)
            .field("currency", &self.currency)
            .field("public_key", &self.public_key.len())
            .finish_non_exhaustive()
    }
}

/// Cut `text` down to at most `length` characters, marking the cut with `...`.
pub fn truncate_text(text: &str, length: usize) -> String {
    let count = text.chars().count();
    if count <= length || length <= 3 {
        return text.to_string();
    }
    let kept: String = text.chars().take(length - 3).collect();
    format!("{kept}...")
}

// =============================================================================
// CLUSTER B: FEED
// =============================================================================

/// Sentinel GUID marking that the feed has wrapped back to its origin.
pub const GENESIS_GUID: &str = "GENESIS-ITEM";

/// One item of the shared feed. Consumed once by fan-out and never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedEntry {
    /// Globally unique id of the item.
    pub guid: String,
    /// Opaque link carrying the `check`, `hash` and `ts` parameters.
    pub link: String,
}

impl FeedEntry {
    /// Create a feed entry.
    pub fn new(guid: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            guid: guid.into(),
            link: link.into(),
        }
    }

    /// Whether this is the wraparound sentinel.
    pub fn is_genesis(&self) -> bool {
        self.guid == GENESIS_GUID
    }
}

/// Query parameters carried by a feed link.
///
/// `ts` is kept exactly as it appeared in the link because it is an input to
/// both keyed hashes; `ts_nanos` is the same value parsed for the cutoff check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkParams {
    /// Claimed stage-1 hex digest.
    pub check: String,
    /// Public content-hash parameter. Input only, never used to fetch.
    pub hash: String,
    /// Timestamp text as published.
    pub ts: String,
    /// Timestamp in nanoseconds since the Unix epoch.
    pub ts_nanos: i64,
}

// =============================================================================
// CLUSTER C: MAIL
// =============================================================================

/// Ordered header fields of a mail message.
///
/// Insertion order is preserved; lookups are case-insensitive on the name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailHeaders(Vec<(String, String)>);

impl MailHeaders {
    /// Empty header set.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Append a field, keeping any existing field with the same name.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.push((name.into(), value.into()));
    }

    /// First value for `name`, or an empty string.
    pub fn get(&self, name: &str) -> &str {
        self.0
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
            .unwrap_or("")
    }

    /// Whether a field named `name` exists.
    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|(key, _)| key.eq_ignore_ascii_case(name))
    }

    /// Iterate fields in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no fields are present.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A decrypted header+body message, handed straight to a forwarder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecryptedMessage {
    /// Header fields in their original order.
    pub headers: MailHeaders,
    /// Raw body text.
    pub body: String,
}

impl DecryptedMessage {
    /// The `From` header.
    pub fn from(&self) -> &str {
        self.headers.get("From")
    }

    /// The `Subject` header.
    pub fn subject(&self) -> &str {
        self.headers.get("Subject")
    }
}
