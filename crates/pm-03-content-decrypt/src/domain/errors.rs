//! # Domain Errors

use thiserror::Error;

/// Content retrieval and decoding errors. Both are recoverable.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ContentError {
    /// Network failure or a non-200 response from the content store.
    #[error("Content fetch failed: {0}")]
    ContentFetch(String),

    /// Bad base64, a message for another key, or an unparsable message.
    #[error("Message decode failed: {0}")]
    MessageDecode(String),
}

impl ContentError {
    /// Whether the failure happened before any bytes were decrypted.
    pub fn is_fetch(&self) -> bool {
        matches!(self, Self::ContentFetch(_))
    }
}
