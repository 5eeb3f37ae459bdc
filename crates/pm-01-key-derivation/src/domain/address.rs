//! # Address Derivation and Credential Assembly

use crate::domain::{DecodedWif, KeyDerivationError};
use shared_crypto::{encode_base58check, hash160, Secp256k1Point};
use shared_types::{Address, Credential, CredentialParts, SharedSecret};

/// P2PKH version byte the publisher binds into every link tag.
pub const TESTNET_P2PKH_VERSION: u8 = 0x6F;

/// base58check P2PKH address of a serialised public key.
///
/// Always uses the testnet version byte, whatever currency the credential
/// came from.
pub fn derive_address(public_key: &[u8]) -> Address {
    let mut payload = Vec::with_capacity(21);
    payload.push(TESTNET_P2PKH_VERSION);
    payload.extend_from_slice(&hash160(public_key));
    Address::new(encode_base58check(&payload))
}

/// Directory bucket for a public key: its final byte.
pub fn directory_bucket(public_key: &[u8]) -> u8 {
    public_key.last().copied().unwrap_or_default()
}

/// Build the immutable credential once the counterpart key is known.
pub fn assemble_credential(
    wif: &str,
    decoded: &DecodedWif,
    counterpart: &[u8],
) -> Result<Credential, KeyDerivationError> {
    let point =
        Secp256k1Point::from_sec1_bytes(counterpart).map_err(|_| KeyDerivationError::InvalidPublicKey)?;

    let public_key = decoded.public_key_bytes();
    let shared = decoded.secret().shared_point(&point);

    Ok(Credential::from_parts(CredentialParts {
        wif: wif.trim().to_string(),
        secret_scalar: decoded.secret().to_bytes(),
        address: derive_address(&public_key),
        public_key,
        currency: decoded.currency(),
        shared_secret: SharedSecret::new(shared),
    }))
}
