//! # OpenPGP Messages
//!
//! The subset of RFC 4880 and RFC 6637 mail publishers use to encrypt to a
//! subscriber: one ECDH subkey on secp256k1, a public-key encrypted session
//! key, and symmetrically encrypted, integrity protected data.
//!
//! ## Key identity
//!
//! A subkey's fingerprint covers its creation time and KDF parameters, and
//! the fingerprint is mixed into the key encryption key. Decrypting with the
//! right scalar but the wrong creation time fails.
//!
//! ## Not handled
//!
//! - Signature verification (signature packets are skipped)
//! - Data packets without a modification detection code
//! - Curves other than secp256k1

mod ecdh;
mod message;
mod packet;

pub use ecdh::{
    EcdhPublicSubkey, EcdhSubkey, KdfHash, KdfParams, SymmetricAlgorithm, SECP256K1_OID,
};
pub use message::{decrypt_message, encrypt_message};
