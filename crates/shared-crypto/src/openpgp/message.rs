//! Encrypted messages: a public-key session key packet followed by
//! integrity-protected data holding a (possibly compressed) literal packet.

use super::ecdh::{EcdhPublicSubkey, EcdhSubkey, SessionKey, SymmetricAlgorithm, ALGO_ECDH};
use super::packet::{
    malformed, read_packet, write_mpi, write_packet, Reader, TAG_COMPRESSED, TAG_LITERAL,
    TAG_MARKER, TAG_ONE_PASS_SIGNATURE, TAG_PKESK, TAG_SEIPD, TAG_SIGNATURE,
    TAG_SYMMETRIC_LEGACY,
};
use crate::CryptoError;
use aes::{Aes128, Aes192, Aes256};
use cfb_mode::cipher::{AsyncStreamCipher, KeyIvInit};
use flate2::read::{DeflateDecoder, ZlibDecoder};
use rand::RngCore;
use sha1::{Digest, Sha1};
use std::io::Read;
use subtle::ConstantTimeEq;

const PKESK_VERSION: u8 = 3;
const SEIPD_VERSION: u8 = 1;
const MDC_HEADER: [u8; 2] = [0xD3, 0x14];
const MDC_LEN: usize = 22;
const BLOCK: usize = 16;
const WILDCARD_KEY_ID: [u8; 8] = [0; 8];

/// Compressed packets nested deeper than this are rejected.
const MAX_NESTING: usize = 4;
/// Upper bound on inflated literal data.
const MAX_INFLATED: u64 = 64 * 1024 * 1024;

/// Decrypt a binary OpenPGP message addressed to `key`.
///
/// Session key packets for other key ids are skipped; a wildcard key id is
/// tried against `key`. Data without a modification detection code is refused.
pub fn decrypt_message(key: &EcdhSubkey, message: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let mut reader = Reader::new(message);
    let mut session = None;

    while !reader.is_empty() {
        let packet = read_packet(&mut reader)?;
        match packet.tag {
            TAG_PKESK if session.is_none() => session = try_session_key(key, &packet.body)?,
            TAG_PKESK | TAG_MARKER => {}
            TAG_SEIPD => {
                let session = session.ok_or_else(|| CryptoError::NoMatchingRecipient {
                    key_id: hex::encode(key.key_id()),
                })?;
                return decrypt_protected(&session, &packet.body);
            }
            TAG_SYMMETRIC_LEGACY => {
                return Err(CryptoError::Unsupported(
                    "encrypted data without integrity protection".into(),
                ))
            }
            other => return Err(malformed(format!("unexpected packet tag {other}"))),
        }
    }
    Err(malformed("no encrypted data packet"))
}

/// Encrypt `plaintext` to `recipient` as a binary OpenPGP message with an
/// AES-256 session key.
pub fn encrypt_message(
    recipient: &EcdhPublicSubkey,
    plaintext: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let session = SessionKey::generate(SymmetricAlgorithm::Aes256);
    let (ephemeral, wrapped) = recipient.wrap_session_key(&session)?;

    let mut pkesk = vec![PKESK_VERSION];
    pkesk.extend_from_slice(&recipient.key_id());
    pkesk.push(ALGO_ECDH);
    write_mpi(&mut pkesk, &ephemeral);
    pkesk.push(wrapped.len() as u8);
    pkesk.extend_from_slice(&wrapped);

    let mut literal = vec![b'b', 0];
    literal.extend_from_slice(&0u32.to_be_bytes());
    literal.extend_from_slice(plaintext);

    let mut prefix = [0u8; BLOCK];
    rand::rngs::OsRng.fill_bytes(&mut prefix);
    let mut data = Vec::with_capacity(plaintext.len() + 64);
    data.extend_from_slice(&prefix);
    data.extend_from_slice(&prefix[BLOCK - 2..]);
    write_packet(&mut data, TAG_LITERAL, &literal);
    data.extend_from_slice(&MDC_HEADER);
    let mdc = Sha1::digest(&data);
    data.extend_from_slice(&mdc);
    cfb_encrypt(session.algorithm, &session.key, &mut data)?;

    let mut seipd = Vec::with_capacity(data.len() + 1);
    seipd.push(SEIPD_VERSION);
    seipd.extend_from_slice(&data);

    let mut out = Vec::with_capacity(pkesk.len() + seipd.len() + 8);
    write_packet(&mut out, TAG_PKESK, &pkesk);
    write_packet(&mut out, TAG_SEIPD, &seipd);
    Ok(out)
}

fn try_session_key(key: &EcdhSubkey, body: &[u8]) -> Result<Option<SessionKey>, CryptoError> {
    let mut r = Reader::new(body);
    if r.u8("session key version")? != PKESK_VERSION {
        return Ok(None);
    }
    let key_id = r.take(8, "key id")?;
    if r.u8("public key algorithm")? != ALGO_ECDH {
        return Ok(None);
    }
    let wildcard = key_id == WILDCARD_KEY_ID;
    if !wildcard && key_id != key.key_id() {
        return Ok(None);
    }

    let ephemeral = r.mpi("ephemeral point")?;
    let wrapped_len = usize::from(r.u8("wrapped key length")?);
    let wrapped = r.take(wrapped_len, "wrapped key")?;
    match key.unwrap_session_key(ephemeral, wrapped) {
        Ok(session) => Ok(Some(session)),
        Err(_) if wildcard => Ok(None),
        Err(e) => Err(e),
    }
}

fn decrypt_protected(session: &SessionKey, body: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let (&version, ciphertext) = body
        .split_first()
        .ok_or_else(|| malformed("empty encrypted data packet"))?;
    if version != SEIPD_VERSION {
        return Err(CryptoError::Unsupported(format!(
            "encrypted data version {version}"
        )));
    }
    if ciphertext.len() < BLOCK + 2 + MDC_LEN {
        return Err(malformed("encrypted data too short"));
    }

    let mut data = ciphertext.to_vec();
    cfb_decrypt(session.algorithm, &session.key, &mut data)?;

    if data[BLOCK - 2..BLOCK] != data[BLOCK..BLOCK + 2] {
        return Err(CryptoError::DecryptionFailed(
            "session key check bytes mismatch".into(),
        ));
    }

    let (covered, mdc) = data.split_at(data.len() - 20);
    if covered[covered.len() - 2..] != MDC_HEADER {
        return Err(CryptoError::IntegrityCheckFailed);
    }
    if !bool::from(Sha1::digest(covered).as_slice().ct_eq(mdc)) {
        return Err(CryptoError::IntegrityCheckFailed);
    }

    literal_data(&covered[BLOCK + 2..covered.len() - 2], 0)
}

fn literal_data(packets: &[u8], depth: usize) -> Result<Vec<u8>, CryptoError> {
    let mut reader = Reader::new(packets);
    while !reader.is_empty() {
        let packet = read_packet(&mut reader)?;
        match packet.tag {
            TAG_LITERAL => {
                let mut r = Reader::new(&packet.body);
                r.u8("literal format")?;
                let name_len = usize::from(r.u8("file name length")?);
                r.take(name_len, "file name")?;
                r.u32("literal date")?;
                return Ok(r.rest().to_vec());
            }
            TAG_COMPRESSED => {
                if depth >= MAX_NESTING {
                    return Err(malformed("compressed packets nested too deep"));
                }
                let inner = decompress(&packet.body)?;
                return literal_data(&inner, depth + 1);
            }
            TAG_ONE_PASS_SIGNATURE | TAG_SIGNATURE | TAG_MARKER => {}
            other => return Err(malformed(format!("unexpected packet tag {other}"))),
        }
    }
    Err(malformed("no literal data packet"))
}

fn decompress(body: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let (&algorithm, data) = body
        .split_first()
        .ok_or_else(|| malformed("empty compressed packet"))?;
    let mut out = Vec::new();
    let read = match algorithm {
        0 => return Ok(data.to_vec()),
        1 => DeflateDecoder::new(data)
            .take(MAX_INFLATED)
            .read_to_end(&mut out),
        2 => ZlibDecoder::new(data).take(MAX_INFLATED).read_to_end(&mut out),
        other => {
            return Err(CryptoError::Unsupported(format!(
                "compression algorithm {other}"
            )))
        }
    };
    read.map_err(|e| malformed(format!("inflate: {e}")))?;
    Ok(out)
}

fn bad_key_length(_: cfb_mode::cipher::InvalidLength) -> CryptoError {
    CryptoError::DecryptionFailed("session key length".into())
}

fn cfb_decrypt(
    algorithm: SymmetricAlgorithm,
    key: &[u8],
    buf: &mut [u8],
) -> Result<(), CryptoError> {
    let iv = [0u8; BLOCK];
    match algorithm {
        SymmetricAlgorithm::Aes128 => cfb_mode::Decryptor::<Aes128>::new_from_slices(key, &iv)
            .map_err(bad_key_length)?
            .decrypt(buf),
        SymmetricAlgorithm::Aes192 => cfb_mode::Decryptor::<Aes192>::new_from_slices(key, &iv)
            .map_err(bad_key_length)?
            .decrypt(buf),
        SymmetricAlgorithm::Aes256 => cfb_mode::Decryptor::<Aes256>::new_from_slices(key, &iv)
            .map_err(bad_key_length)?
            .decrypt(buf),
    }
    Ok(())
}

fn cfb_encrypt(
    algorithm: SymmetricAlgorithm,
    key: &[u8],
    buf: &mut [u8],
) -> Result<(), CryptoError> {
    let iv = [0u8; BLOCK];
    match algorithm {
        SymmetricAlgorithm::Aes128 => cfb_mode::Encryptor::<Aes128>::new_from_slices(key, &iv)
            .map_err(bad_key_length)?
            .encrypt(buf),
        SymmetricAlgorithm::Aes192 => cfb_mode::Encryptor::<Aes192>::new_from_slices(key, &iv)
            .map_err(bad_key_length)?
            .encrypt(buf),
        SymmetricAlgorithm::Aes256 => cfb_mode::Encryptor::<Aes256>::new_from_slices(key, &iv)
            .map_err(bad_key_length)?
            .encrypt(buf),
    }
    Ok(())
}
