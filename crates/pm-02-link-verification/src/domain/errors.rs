//! # Domain Errors
//!
//! Every variant is recoverable: the checker logs it and moves to the next link.

use thiserror::Error;

/// Link verification error types.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LinkError {
    /// The link is not a valid absolute URL.
    #[error("Malformed link: {0}")]
    MalformedLink(String),

    /// A required query parameter is absent.
    #[error("Link is missing the `{0}` parameter")]
    MissingParameter(&'static str),

    /// `ts` is not a signed 64-bit integer.
    #[error("Invalid link timestamp: {0:?}")]
    InvalidTimestamp(String),
}
