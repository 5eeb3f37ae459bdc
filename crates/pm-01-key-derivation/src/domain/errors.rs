//! # Domain Errors
//!
//! All three variants are terminal for one subscribe attempt: the address is
//! not added and no partial credential exists.

use thiserror::Error;

/// Key derivation error types.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum KeyDerivationError {
    /// The credential string is not a valid base58check private key.
    #[error("Invalid credential: {0}")]
    CredentialFormat(String),

    /// The key directory could not be reached or returned unusable data.
    #[error("Key directory lookup failed: {0}")]
    KeyDirectory(String),

    /// The directory's counterpart key is not a point on the curve.
    #[error("The public key is invalid")]
    InvalidPublicKey,
}

impl KeyDerivationError {
    /// Short text suitable for showing to a user.
    pub fn friendly_message(&self) -> &'static str {
        match self {
            Self::CredentialFormat(_) => "That does not look like a valid private key.",
            Self::KeyDirectory(_) => "Could not reach the key directory. Try again later.",
            Self::InvalidPublicKey => "The key directory returned an invalid key.",
        }
    }
}
