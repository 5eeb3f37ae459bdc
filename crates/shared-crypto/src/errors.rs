//! Crypto error types.

use thiserror::Error;

/// Cryptographic operation errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CryptoError {
    /// Input is not valid base58
    #[error("Invalid encoding: {0}")]
    InvalidEncoding(String),

    /// base58check checksum did not match
    #[error("Checksum mismatch")]
    ChecksumMismatch,

    /// Invalid public key (bad prefix, wrong length or not on the curve)
    #[error("Invalid public key")]
    InvalidPublicKey,

    /// Invalid private key
    #[error("Invalid private key")]
    InvalidPrivateKey,

    /// OpenPGP framing that could not be parsed
    #[error("Malformed OpenPGP message: {0}")]
    MalformedMessage(String),

    /// Algorithm or packet version this decoder does not handle
    #[error("Unsupported OpenPGP feature: {0}")]
    Unsupported(String),

    /// No session key packet is addressed to the decrypting key
    #[error("No session key addressed to key {key_id}")]
    NoMatchingRecipient {
        /// Hex key id of the decrypting subkey
        key_id: String,
    },

    /// The modification detection code did not match
    #[error("Integrity check failed")]
    IntegrityCheckFailed,

    /// Encryption failed
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    /// Decryption failed
    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),
}
