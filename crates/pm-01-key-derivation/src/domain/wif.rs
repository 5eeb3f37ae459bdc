//! # Wallet Import Format
//!
//! `base58check( version || scalar(32) || [0x01] )`. The trailing `0x01`
//! marks a compressed public key.

use crate::domain::KeyDerivationError;
use shared_crypto::{decode_base58, decode_base58check, CryptoError, Secp256k1Secret};
use shared_types::CurrencyTag;

const SCALAR_LEN: usize = 32;
const COMPRESSION_FLAG: u8 = 0x01;

/// A decoded private-key credential.
#[derive(Clone)]
pub struct DecodedWif {
    version: u8,
    secret: Secp256k1Secret,
    compressed: bool,
}

impl DecodedWif {
    /// Decode and validate a WIF string.
    pub fn parse(wif: &str) -> Result<Self, KeyDerivationError> {
        let raw = decode_base58(wif.trim()).map_err(format_error)?;
        if raw.len() < 4 {
            return Err(KeyDerivationError::CredentialFormat(
                "credential is too short".into(),
            ));
        }

        let payload = decode_base58check(wif.trim()).map_err(format_error)?;
        let compressed = match payload.len() {
            n if n == 1 + SCALAR_LEN => false,
            n if n == 2 + SCALAR_LEN && payload[1 + SCALAR_LEN] == COMPRESSION_FLAG => true,
            n => {
                return Err(KeyDerivationError::CredentialFormat(format!(
                    "unexpected payload length {n}"
                )))
            }
        };

        let mut scalar = [0u8; SCALAR_LEN];
        scalar.copy_from_slice(&payload[1..1 + SCALAR_LEN]);
        let secret = Secp256k1Secret::from_bytes(&scalar).map_err(format_error)?;

        Ok(Self {
            version: payload[0],
            secret,
            compressed,
        })
    }

    /// The version byte.
    pub fn version(&self) -> u8 {
        self.version
    }

    /// Currency family for the version byte.
    pub fn currency(&self) -> CurrencyTag {
        CurrencyTag::from_version_byte(self.version)
    }

    /// Whether the public key is serialised compressed.
    pub fn is_compressed(&self) -> bool {
        self.compressed
    }

    /// The private scalar.
    pub fn secret(&self) -> &Secp256k1Secret {
        &self.secret
    }

    /// Serialised public key following the compression flag.
    pub fn public_key_bytes(&self) -> Vec<u8> {
        self.secret.public_key_bytes(self.compressed)
    }
}

fn format_error(err: CryptoError) -> KeyDerivationError {
    KeyDerivationError::CredentialFormat(err.to_string())
}
