//! # HTTP Key Directory
//!
//! `GET {directory_url}/{bucket:02x}` returning a single PEM block whose
//! contents are:
//!
//! ```text
//! SEQUENCE {
//!     id           [0] EXPLICIT OBJECT IDENTIFIER OPTIONAL,
//!     namedCurve   [1] EXPLICIT OBJECT IDENTIFIER OPTIONAL,
//!     publicKey    [2] EXPLICIT BIT STRING OPTIONAL
//! }
//! ```
//!
//! Only the bit string is used.

use crate::config::KeyDerivationConfig;
use crate::domain::KeyDerivationError;
use crate::ports::KeyDirectory;
use async_trait::async_trait;
use der::asn1::{BitStringRef, ObjectIdentifier};
use der::{Decode, Sequence};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::debug;

/// DER body of a directory response.
#[derive(Clone, Debug, Eq, PartialEq, Sequence)]
pub(crate) struct DirectoryKeyInfo<'a> {
    #[asn1(context_specific = "0", optional = "true")]
    pub id: Option<ObjectIdentifier>,

    #[asn1(context_specific = "1", optional = "true")]
    pub named_curve: Option<ObjectIdentifier>,

    #[asn1(context_specific = "2", optional = "true")]
    pub public_key: Option<BitStringRef<'a>>,
}

/// Extract the counterpart public key bytes from a PEM response body.
pub fn parse_directory_response(body: &[u8]) -> Result<Vec<u8>, KeyDerivationError> {
    if body.is_empty() {
        return Err(directory_error("empty pem block"));
    }

    let blocks = pem::parse_many(body).map_err(directory_error)?;
    let block = match blocks.as_slice() {
        [single] => single,
        [] => return Err(directory_error("no pem block")),
        _ => return Err(directory_error("pem block: extra data")),
    };

    let info = DirectoryKeyInfo::from_der(block.contents()).map_err(directory_error)?;
    let key = info
        .public_key
        .ok_or_else(|| directory_error("missing public key bit string"))?;

    Ok(key.raw_bytes().to_vec())
}

fn directory_error(detail: impl std::fmt::Display) -> KeyDerivationError {
    KeyDerivationError::KeyDirectory(detail.to_string())
}

/// Key directory over HTTP.
pub struct HttpKeyDirectory {
    client: Client,
    config: KeyDerivationConfig,
}

impl HttpKeyDirectory {
    /// Create a directory client.
    pub fn new(config: KeyDerivationConfig) -> Result<Self, KeyDerivationError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| directory_error(format!("http client: {e}")))?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl KeyDirectory for HttpKeyDirectory {
    async fn fetch_counterpart(&self, bucket: u8) -> Result<Vec<u8>, KeyDerivationError> {
        let url = self.config.bucket_url(bucket);
        debug!("[pm-01] Fetching counterpart key from {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| directory_error(format!("http get public key: {e}")))?;

        if response.status() != StatusCode::OK {
            return Err(directory_error(format!(
                "http get status: {}",
                response.status()
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| directory_error(format!("http get read body: {e}")))?;

        parse_directory_response(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use der::Encode;

    const EC_PUBLIC_KEY: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.2.1");
    const SECP256K1: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.132.0.10");

    fn pem_of(info: &DirectoryKeyInfo<'_>) -> String {
        pem::encode(&pem::Pem::new("PUBLIC KEY", info.to_der().unwrap()))
    }

    fn key_bytes() -> Vec<u8> {
        let mut key = vec![0x02];
        key.extend_from_slice(&[0xab; 32]);
        key
    }

    #[test]
    fn test_parse_full_structure() {
        let key = key_bytes();
        let info = DirectoryKeyInfo {
            id: Some(EC_PUBLIC_KEY),
            named_curve: Some(SECP256K1),
            public_key: Some(BitStringRef::from_bytes(&key).unwrap()),
        };
        assert_eq!(parse_directory_response(pem_of(&info).as_bytes()).unwrap(), key);
    }

    #[test]
    fn test_parse_only_bit_string() {
        let key = key_bytes();
        let info = DirectoryKeyInfo {
            id: None,
            named_curve: None,
            public_key: Some(BitStringRef::from_bytes(&key).unwrap()),
        };
        assert_eq!(parse_directory_response(pem_of(&info).as_bytes()).unwrap(), key);
    }

    #[test]
    fn test_missing_bit_string() {
        let info = DirectoryKeyInfo {
            id: Some(EC_PUBLIC_KEY),
            named_curve: None,
            public_key: None,
        };
        assert!(matches!(
            parse_directory_response(pem_of(&info).as_bytes()),
            Err(KeyDerivationError::KeyDirectory(_))
        ));
    }

    #[test]
    fn test_empty_and_garbage_bodies() {
        assert!(parse_directory_response(b"").is_err());
        assert!(parse_directory_response(b"not a pem block").is_err());
    }

    #[test]
    fn test_two_blocks_rejected() {
        let key = key_bytes();
        let info = DirectoryKeyInfo {
            id: None,
            named_curve: None,
            public_key: Some(BitStringRef::from_bytes(&key).unwrap()),
        };
        let doubled = format!("{}{}", pem_of(&info), pem_of(&info));
        assert!(parse_directory_response(doubled.as_bytes()).is_err());
    }

    #[test]
    fn test_trailing_der_rejected() {
        let key = key_bytes();
        let info = DirectoryKeyInfo {
            id: None,
            named_curve: None,
            public_key: Some(BitStringRef::from_bytes(&key).unwrap()),
        };
        let mut der = info.to_der().unwrap();
        der.extend_from_slice(&[0x05, 0x00]);
        let body = pem::encode(&pem::Pem::new("PUBLIC KEY", der));
        assert!(parse_directory_response(body.as_bytes()).is_err());
    }

    #[tokio::test]
    async fn test_unreachable_directory() {
        let directory = HttpKeyDirectory::new(KeyDerivationConfig {
            directory_url: "http://127.0.0.1:1".into(),
            request_timeout_secs: 2,
        })
        .unwrap();
        assert!(matches!(
            directory.fetch_counterpart(0x01).await,
            Err(KeyDerivationError::KeyDirectory(_))
        ));
    }
}
