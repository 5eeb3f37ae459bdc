//! # Keyed Hashes
//!
//! HMAC-SHA256 rendered as lowercase hex, and the comparison used on tags.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Lowercase hex HMAC-SHA256 of `message` keyed by `key`.
pub fn hmac_sha256_hex(key: &[u8], message: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC can take key of any size");
    mac.update(message);
    hex::encode(mac.finalize().into_bytes())
}

/// Compare two hex digests without an early exit on the first mismatch.
///
/// Lengths are not secret, so a length mismatch returns immediately.
pub fn hex_digest_eq(expected: &str, claimed: &str) -> bool {
    if expected.len() != claimed.len() {
        return false;
    }
    expected.as_bytes().ct_eq(claimed.as_bytes()).into()
}
