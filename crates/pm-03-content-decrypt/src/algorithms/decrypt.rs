//! # Content Decoding
//!
//! The content store serves a binary OpenPGP message as base64 text,
//! possibly wrapped across lines.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Utc};
use shared_crypto::{decrypt_message, encrypt_message, EcdhPublicSubkey, KdfParams, Secp256k1Point};

use crate::domain::{key_creation_time, ContentError, DecryptionKey};

/// Decode base64 text and decrypt the message inside with `key`.
pub fn decrypt_content(key: &DecryptionKey, encoded: &[u8]) -> Result<Vec<u8>, ContentError> {
    let compact: Vec<u8> = encoded
        .iter()
        .copied()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();

    let message = STANDARD
        .decode(&compact)
        .map_err(|e| ContentError::MessageDecode(format!("base64: {e}")))?;

    decrypt_message(key.subkey(), &message).map_err(|e| ContentError::MessageDecode(e.to_string()))
}

/// Encrypt `plaintext` to the subkey a publisher derives for a SEC1 public
/// key and a link timestamp, and return base64 text.
///
/// The publishing side lives elsewhere; this is for tooling and tests.
pub fn seal_message(
    recipient_public_key: &[u8],
    created_at: DateTime<Utc>,
    plaintext: &[u8],
) -> Result<String, ContentError> {
    let point = Secp256k1Point::from_sec1_bytes(recipient_public_key)
        .map_err(|e| ContentError::MessageDecode(e.to_string()))?;
    let subkey = EcdhPublicSubkey::new(point, key_creation_time(created_at), KdfParams::PUBLISHER);
    let message =
        encrypt_message(&subkey, plaintext).map_err(|e| ContentError::MessageDecode(e.to_string()))?;
    Ok(STANDARD.encode(message))
}
