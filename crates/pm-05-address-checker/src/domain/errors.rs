//! # Domain Errors

use thiserror::Error;

/// Failures while handling one link. All of them are logged and the checker
/// moves on to the next link.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CheckerError {
    /// Network failure or non-200 from the content store.
    #[error("Content fetch failed: {0}")]
    ContentFetch(String),

    /// The envelope or the message inside it could not be decoded.
    #[error("Message decode failed: {0}")]
    MessageDecode(String),
}
