//! ECDH subkeys on secp256k1 (RFC 6637) and the session keys they wrap.

use super::packet::{malformed, write_mpi};
use crate::{CryptoError, Secp256k1Point, Secp256k1Secret};
use aes::cipher::generic_array::GenericArray;
use aes::{Aes128, Aes192, Aes256};
use aes_kw::Kek;
use k256::elliptic_curve::sec1::ToEncodedPoint;
use rand::RngCore;
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha384, Sha512};
use zeroize::Zeroizing;

/// DER object identifier of secp256k1 without the tag and length octets.
pub const SECP256K1_OID: [u8; 5] = [0x2B, 0x81, 0x04, 0x00, 0x0A];

pub(crate) const ALGO_ECDH: u8 = 18;
const KEY_VERSION: u8 = 4;
const ANONYMOUS_SENDER: &[u8; 20] = b"Anonymous Sender    ";

/// Hash used by the key derivation function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KdfHash {
    /// SHA2-256
    Sha256,
    /// SHA2-384
    Sha384,
    /// SHA2-512
    Sha512,
}

impl KdfHash {
    fn id(self) -> u8 {
        match self {
            Self::Sha256 => 8,
            Self::Sha384 => 9,
            Self::Sha512 => 10,
        }
    }

    fn digest(self, parts: &[&[u8]]) -> Zeroizing<Vec<u8>> {
        fn run<D: Digest>(parts: &[&[u8]]) -> Vec<u8> {
            let mut hasher = D::new();
            for part in parts {
                hasher.update(part);
            }
            hasher.finalize().to_vec()
        }
        Zeroizing::new(match self {
            Self::Sha256 => run::<Sha256>(parts),
            Self::Sha384 => run::<Sha384>(parts),
            Self::Sha512 => run::<Sha512>(parts),
        })
    }
}

/// AES variants usable for session keys and key wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymmetricAlgorithm {
    /// AES with a 128-bit key
    Aes128,
    /// AES with a 192-bit key
    Aes192,
    /// AES with a 256-bit key
    Aes256,
}

impl SymmetricAlgorithm {
    /// OpenPGP algorithm id.
    pub fn id(self) -> u8 {
        match self {
            Self::Aes128 => 7,
            Self::Aes192 => 8,
            Self::Aes256 => 9,
        }
    }

    /// Key length in bytes.
    pub fn key_len(self) -> usize {
        match self {
            Self::Aes128 => 16,
            Self::Aes192 => 24,
            Self::Aes256 => 32,
        }
    }

    pub(crate) fn from_id(id: u8) -> Result<Self, CryptoError> {
        match id {
            7 => Ok(Self::Aes128),
            8 => Ok(Self::Aes192),
            9 => Ok(Self::Aes256),
            other => Err(CryptoError::Unsupported(format!(
                "symmetric algorithm {other}"
            ))),
        }
    }
}

/// KDF parameters stored in the subkey packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    /// Hash fed with the shared coordinate
    pub hash: KdfHash,
    /// Cipher wrapping the session key
    pub cipher: SymmetricAlgorithm,
}

impl KdfParams {
    /// What mail publishers put on the subkeys they derive.
    pub const PUBLISHER: Self = Self {
        hash: KdfHash::Sha512,
        cipher: SymmetricAlgorithm::Aes256,
    };

    fn encode(self) -> [u8; 4] {
        [0x03, 0x01, self.hash.id(), self.cipher.id()]
    }
}

impl Default for KdfParams {
    fn default() -> Self {
        Self::PUBLISHER
    }
}

/// Public half of an ECDH encryption subkey.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EcdhPublicSubkey {
    point: Secp256k1Point,
    created: u32,
    kdf: KdfParams,
}

impl EcdhPublicSubkey {
    /// Subkey over `point`, created at `created` (seconds since the epoch).
    pub fn new(point: Secp256k1Point, created: u32, kdf: KdfParams) -> Self {
        Self {
            point,
            created,
            kdf,
        }
    }

    /// Creation time the fingerprint commits to.
    pub fn created(&self) -> u32 {
        self.created
    }

    /// Body of the version 4 public subkey packet.
    pub fn packet_body(&self) -> Vec<u8> {
        let mut body = Vec::with_capacity(88);
        body.push(KEY_VERSION);
        body.extend_from_slice(&self.created.to_be_bytes());
        body.push(ALGO_ECDH);
        body.push(SECP256K1_OID.len() as u8);
        body.extend_from_slice(&SECP256K1_OID);
        write_mpi(&mut body, &self.point.to_bytes(false));
        body.extend_from_slice(&self.kdf.encode());
        body
    }

    /// Version 4 fingerprint.
    pub fn fingerprint(&self) -> [u8; 20] {
        let body = self.packet_body();
        let mut hasher = Sha1::new();
        hasher.update([0x99u8]);
        hasher.update((body.len() as u16).to_be_bytes());
        hasher.update(&body);
        hasher.finalize().into()
    }

    /// Low 64 bits of the fingerprint.
    pub fn key_id(&self) -> [u8; 8] {
        let fingerprint = self.fingerprint();
        let mut id = [0u8; 8];
        id.copy_from_slice(&fingerprint[12..]);
        id
    }

    /// Key encryption key for the shared x coordinate.
    fn kek(&self, shared_x: &[u8]) -> Zeroizing<Vec<u8>> {
        let mut param = Vec::with_capacity(56);
        param.push(SECP256K1_OID.len() as u8);
        param.extend_from_slice(&SECP256K1_OID);
        param.push(ALGO_ECDH);
        param.extend_from_slice(&self.kdf.encode());
        param.extend_from_slice(ANONYMOUS_SENDER);
        param.extend_from_slice(&self.fingerprint());

        let counter = 1u32.to_be_bytes();
        let mut kek = self.kdf.hash.digest(&[&counter[..], shared_x, param.as_slice()]);
        kek.truncate(self.kdf.cipher.key_len());
        kek
    }

    /// Wrap `session` for this subkey. Returns the ephemeral point and the
    /// wrapped key.
    pub(crate) fn wrap_session_key(
        &self,
        session: &SessionKey,
    ) -> Result<(Vec<u8>, Vec<u8>), CryptoError> {
        let ephemeral = k256::ecdh::EphemeralSecret::random(&mut rand::rngs::OsRng);
        let shared = ephemeral.diffie_hellman(self.point.public_key());
        let kek = self.kek(shared.raw_secret_bytes().as_slice());

        let encoded = session.encode();
        let mut wrapped = vec![0u8; encoded.len() + 8];
        key_wrap(self.kdf.cipher, &kek, &encoded, &mut wrapped)?;

        let point = ephemeral.public_key().to_encoded_point(false);
        Ok((point.as_bytes().to_vec(), wrapped))
    }
}

/// ECDH encryption subkey with its secret scalar.
#[derive(Clone)]
pub struct EcdhSubkey {
    secret: Secp256k1Secret,
    public: EcdhPublicSubkey,
}

impl EcdhSubkey {
    /// Subkey for `secret`, created at `created` (seconds since the epoch).
    pub fn new(secret: Secp256k1Secret, created: u32, kdf: KdfParams) -> Self {
        let public = EcdhPublicSubkey::new(secret.public_point(), created, kdf);
        Self { secret, public }
    }

    /// Public half.
    pub fn public(&self) -> &EcdhPublicSubkey {
        &self.public
    }

    /// Low 64 bits of the fingerprint.
    pub fn key_id(&self) -> [u8; 8] {
        self.public.key_id()
    }

    pub(crate) fn unwrap_session_key(
        &self,
        ephemeral: &[u8],
        wrapped: &[u8],
    ) -> Result<SessionKey, CryptoError> {
        let point = Secp256k1Point::from_sec1_bytes(ephemeral)?;
        let shared = k256::ecdh::diffie_hellman(
            self.secret.secret_key().to_nonzero_scalar(),
            point.public_key().as_affine(),
        );
        let kek = self.public.kek(shared.raw_secret_bytes().as_slice());

        if wrapped.len() < 24 || wrapped.len() % 8 != 0 {
            return Err(malformed(format!("wrapped key of {} bytes", wrapped.len())));
        }
        let mut encoded = Zeroizing::new(vec![0u8; wrapped.len() - 8]);
        key_unwrap(self.public.kdf.cipher, &kek, wrapped, &mut encoded)?;
        SessionKey::decode(&encoded)
    }
}

impl std::fmt::Debug for EcdhSubkey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EcdhSubkey")
            .field("key_id", &hex::encode(self.key_id()))
            .finish_non_exhaustive()
    }
}

/// Symmetric key protecting one message.
pub(crate) struct SessionKey {
    pub algorithm: SymmetricAlgorithm,
    pub key: Zeroizing<Vec<u8>>,
}

impl SessionKey {
    pub(crate) fn generate(algorithm: SymmetricAlgorithm) -> Self {
        let mut key = Zeroizing::new(vec![0u8; algorithm.key_len()]);
        rand::rngs::OsRng.fill_bytes(&mut key);
        Self { algorithm, key }
    }

    fn checksum(key: &[u8]) -> u16 {
        key.iter().fold(0u16, |acc, b| acc.wrapping_add(u16::from(*b)))
    }

    /// `algorithm || key || checksum`, PKCS#5 padded to a multiple of eight.
    fn encode(&self) -> Zeroizing<Vec<u8>> {
        let mut out = Zeroizing::new(Vec::with_capacity(self.key.len() + 11));
        out.push(self.algorithm.id());
        out.extend_from_slice(&self.key);
        out.extend_from_slice(&Self::checksum(&self.key).to_be_bytes());
        let pad = 8 - out.len() % 8;
        let new_len = out.len() + pad;
        out.resize(new_len, pad as u8);
        out
    }

    fn decode(encoded: &[u8]) -> Result<Self, CryptoError> {
        let pad = usize::from(*encoded.last().unwrap_or(&0));
        let padded_ok = pad != 0
            && pad <= encoded.len()
            && encoded[encoded.len() - pad..]
                .iter()
                .all(|b| usize::from(*b) == pad);
        if !padded_ok {
            return Err(CryptoError::DecryptionFailed(
                "bad session key padding".into(),
            ));
        }
        let unpadded = &encoded[..encoded.len() - pad];
        let (&id, rest) = unpadded
            .split_first()
            .ok_or_else(|| CryptoError::DecryptionFailed("empty session key".into()))?;
        let algorithm = SymmetricAlgorithm::from_id(id)?;
        if rest.len() != algorithm.key_len() + 2 {
            return Err(CryptoError::DecryptionFailed(format!(
                "session key of {} bytes for algorithm {id}",
                rest.len().saturating_sub(2)
            )));
        }
        let (key, sum) = rest.split_at(algorithm.key_len());
        if Self::checksum(key).to_be_bytes() != sum {
            return Err(CryptoError::DecryptionFailed("session key checksum".into()));
        }
        Ok(Self {
            algorithm,
            key: Zeroizing::new(key.to_vec()),
        })
    }
}

fn key_wrap(
    cipher: SymmetricAlgorithm,
    kek: &[u8],
    data: &[u8],
    out: &mut [u8],
) -> Result<(), CryptoError> {
    let result = match cipher {
        SymmetricAlgorithm::Aes128 => {
            Kek::<Aes128>::new(GenericArray::from_slice(kek)).wrap(data, out)
        }
        SymmetricAlgorithm::Aes192 => {
            Kek::<Aes192>::new(GenericArray::from_slice(kek)).wrap(data, out)
        }
        SymmetricAlgorithm::Aes256 => {
            Kek::<Aes256>::new(GenericArray::from_slice(kek)).wrap(data, out)
        }
    };
    result.map_err(|e| CryptoError::EncryptionFailed(format!("key wrap: {e}")))
}

fn key_unwrap(
    cipher: SymmetricAlgorithm,
    kek: &[u8],
    data: &[u8],
    out: &mut [u8],
) -> Result<(), CryptoError> {
    let result = match cipher {
        SymmetricAlgorithm::Aes128 => {
            Kek::<Aes128>::new(GenericArray::from_slice(kek)).unwrap(data, out)
        }
        SymmetricAlgorithm::Aes192 => {
            Kek::<Aes192>::new(GenericArray::from_slice(kek)).unwrap(data, out)
        }
        SymmetricAlgorithm::Aes256 => {
            Kek::<Aes256>::new(GenericArray::from_slice(kek)).unwrap(data, out)
        }
    };
    result.map_err(|e| CryptoError::DecryptionFailed(format!("key unwrap: {e}")))
}
