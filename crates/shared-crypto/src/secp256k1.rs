//! # secp256k1 Keys and Points
//!
//! Private scalars, public points, and the full-point multiplication used to
//! derive a subscriber's shared secret.
//!
//! ## Security Notes
//!
//! - Public points are parsed through SEC1 decoding, which rejects the point
//!   at infinity and any coordinates that are not on the curve
//! - Secret scalars are zeroized on drop by `k256::SecretKey`

use crate::CryptoError;
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::{PublicKey, Scalar, SecretKey};

/// A secp256k1 private scalar.
#[derive(Clone)]
pub struct Secp256k1Secret {
    key: SecretKey,
}

impl Secp256k1Secret {
    /// Create from a big-endian 32-byte scalar.
    pub fn from_bytes(bytes: &[u8; 32]) -> Result<Self, CryptoError> {
        let key = SecretKey::from_slice(bytes).map_err(|_| CryptoError::InvalidPrivateKey)?;
        Ok(Self { key })
    }

    /// Generate a random scalar.
    pub fn generate() -> Self {
        Self {
            key: SecretKey::random(&mut rand::rngs::OsRng),
        }
    }

    /// Big-endian scalar bytes.
    pub fn to_bytes(&self) -> [u8; 32] {
        self.key.to_bytes().into()
    }

    /// The matching public point.
    pub fn public_point(&self) -> Secp256k1Point {
        Secp256k1Point(self.key.public_key())
    }

    /// Serialised public key, 33 bytes compressed or 65 bytes uncompressed.
    pub fn public_key_bytes(&self, compressed: bool) -> Vec<u8> {
        self.public_point().to_bytes(compressed)
    }

    /// Multiply `counterpart` by this scalar and return the uncompressed
    /// SEC1 encoding (`0x04 || X || Y`) of the resulting point.
    pub fn shared_point(&self, counterpart: &Secp256k1Point) -> Vec<u8> {
        let scalar: Scalar = *self.key.to_nonzero_scalar();
        let point = (counterpart.0.to_projective() * scalar).to_affine();
        point.to_encoded_point(false).as_bytes().to_vec()
    }

    pub(crate) fn secret_key(&self) -> &SecretKey {
        &self.key
    }
}

/// A validated secp256k1 public point.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Secp256k1Point(PublicKey);

impl Secp256k1Point {
    /// Parse a SEC1 encoded point (`0x02`/`0x03` compressed, `0x04` uncompressed).
    pub fn from_sec1_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        match bytes.first() {
            Some(0x02) | Some(0x03) | Some(0x04) => {}
            _ => return Err(CryptoError::InvalidPublicKey),
        }
        PublicKey::from_sec1_bytes(bytes)
            .map(Self)
            .map_err(|_| CryptoError::InvalidPublicKey)
    }

    /// SEC1 encoding.
    pub fn to_bytes(&self, compressed: bool) -> Vec<u8> {
        self.0.to_encoded_point(compressed).as_bytes().to_vec()
    }

    pub(crate) fn public_key(&self) -> &PublicKey {
        &self.0
    }
}
