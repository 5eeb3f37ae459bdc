//! # Keyed-Hash Stages

use crate::domain::VerificationOutcome;
use shared_crypto::{hex_digest_eq, hmac_sha256_hex};
use shared_types::{Address, SharedSecret};

const META_CONTEXT: &str = "com.pubkemail.meta.v1";
const CONTENT_CONTEXT: &str = "com.pubkemail.content.v1";

fn tag(context: &str, secret: &SharedSecret, address: &Address, hash: &str, ts: &str) -> String {
    let message = format!("{context}:{address}/{hash}:{ts}");
    hmac_sha256_hex(secret.as_bytes(), message.as_bytes())
}

/// Stage-1 digest: proves the link is addressed to `address`.
pub fn meta_tag(secret: &SharedSecret, address: &Address, hash: &str, ts: &str) -> String {
    tag(META_CONTEXT, secret, address, hash, ts)
}

/// Stage-2 digest: the content locator.
pub fn content_tag(secret: &SharedSecret, address: &Address, hash: &str, ts: &str) -> String {
    tag(CONTENT_CONTEXT, secret, address, hash, ts)
}

/// Run both stages. Stage 2 is skipped when stage 1 does not match.
pub fn verify(
    secret: &SharedSecret,
    address: &Address,
    claimed_tag: &str,
    hash: &str,
    ts: &str,
) -> VerificationOutcome {
    let expected = meta_tag(secret, address, hash, ts);
    if !hex_digest_eq(&expected, claimed_tag) {
        return VerificationOutcome::no_match();
    }
    VerificationOutcome::matched(content_tag(secret, address, hash, ts))
}
