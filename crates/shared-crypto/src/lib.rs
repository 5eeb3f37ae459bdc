//! # Shared Crypto - Cryptographic Primitives
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `encoding` | base58check | Credential and address encoding |
//! | `hashing` | SHA-256, RIPEMD-160 | Address and key-id derivation |
//! | `secp256k1` | secp256k1 | Public keys, point validation, shared points |
//! | `mac` | HMAC-SHA256 | Link tags |
//! | `openpgp` | ECDH (RFC 6637) + AES-CFB + SHA-1 MDC | Mail content at rest |
//!
//! ## Security Properties
//!
//! - Counterpart points are validated on the curve before any multiplication
//! - Session keys are wrapped with an ephemeral-static ECDH, never reused
//! - Encrypted data without a modification detection code is refused
//! - Tag comparison is constant-time

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod encoding;
pub mod errors;
pub mod hashing;
pub mod mac;
pub mod openpgp;
pub mod secp256k1;

// Re-exports
pub use encoding::{decode_base58, decode_base58check, encode_base58check};
pub use errors::CryptoError;
pub use hashing::{hash160, sha256};
pub use mac::{hex_digest_eq, hmac_sha256_hex};
pub use openpgp::{decrypt_message, encrypt_message, EcdhPublicSubkey, EcdhSubkey, KdfParams};
pub use secp256k1::{Secp256k1Point, Secp256k1Secret};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
