//! # base58check
//!
//! Credential strings and addresses use Bitcoin-style base58 with a 4-byte
//! double-SHA256 checksum.

use crate::CryptoError;

/// Decode base58 without checksum handling (the checksum stays attached).
pub fn decode_base58(input: &str) -> Result<Vec<u8>, CryptoError> {
    bs58::decode(input)
        .into_vec()
        .map_err(|e| CryptoError::InvalidEncoding(e.to_string()))
}

/// Decode base58check, verifying and stripping the checksum.
pub fn decode_base58check(input: &str) -> Result<Vec<u8>, CryptoError> {
    bs58::decode(input)
        .with_check(None)
        .into_vec()
        .map_err(|e| match e {
            bs58::decode::Error::InvalidChecksum { .. } => CryptoError::ChecksumMismatch,
            other => CryptoError::InvalidEncoding(other.to_string()),
        })
}

/// Encode `payload` as base58check.
pub fn encode_base58check(payload: &[u8]) -> String {
    bs58::encode(payload).with_check().into_string()
}
