//! # PM-03 Content Fetch & Decrypt
//!
//! Retrieves ciphertext by content locator and turns it into a header+body
//! message.
//!
//! **Subsystem ID:** 3
//! **Architecture:** Hexagonal (Domain + Ports/Adapters)
//!
//! ## Pipeline
//!
//! ```text
//! locator ──GET──▶ base64 text ──decode──▶ OpenPGP message ──ECDH subkey──▶ RFC 822 bytes
//!                                                                              │
//!                                                    DecryptedMessage ◀──parse─┘
//! ```
//!
//! The subkey is rebuilt per message from the credential scalar and the link
//! timestamp, which is its creation time.
//!
//! Failures here are recoverable: the checker logs them and moves on.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod algorithms;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

// Re-exports
pub use adapters::HttpContentStore;
pub use algorithms::{decrypt_content, parse_message, seal_message};
pub use application::ContentService;
pub use config::ContentConfig;
pub use domain::{
    key_creation_time, ContentError, DecryptionIdentity, DecryptionKey, UNDISCLOSED,
};
pub use ports::{ContentDecryptApi, ContentStore, MockContentStore};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
