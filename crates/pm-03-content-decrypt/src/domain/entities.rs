//! # Domain Entities

use chrono::{DateTime, Utc};
use shared_crypto::{EcdhSubkey, KdfParams, Secp256k1Secret};
use shared_types::Credential;
use std::fmt;

use crate::domain::ContentError;

/// Placeholder used for every identity field that could name the user.
pub const UNDISCLOSED: &str = "Undisclosed";

/// Metadata attached to the decrypting key. Never identifies the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecryptionIdentity {
    /// Display name.
    pub name: String,
    /// Free-form comment.
    pub comment: String,
    /// Email.
    pub email: String,
    /// Key creation time, taken from the link timestamp.
    pub created_at: DateTime<Utc>,
}

impl DecryptionIdentity {
    /// The anonymised identity used for every decryption.
    pub fn undisclosed(created_at: DateTime<Utc>) -> Self {
        Self {
            name: UNDISCLOSED.to_string(),
            comment: String::new(),
            email: UNDISCLOSED.to_string(),
            created_at,
        }
    }
}

impl fmt::Display for DecryptionIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.name, self.email)
    }
}

/// Seconds since the epoch as stored in a key packet. Truncates outside
/// the 32-bit range the same way publishers do.
pub fn key_creation_time(created_at: DateTime<Utc>) -> u32 {
    created_at.timestamp() as u32
}

/// ECDH subkey built from the credential's scalar.
///
/// The subkey fingerprint covers the creation time, so a key built for the
/// wrong link timestamp cannot open the message.
pub struct DecryptionKey {
    subkey: EcdhSubkey,
    identity: DecryptionIdentity,
}

impl DecryptionKey {
    /// Build the decryption key for one message.
    pub fn for_credential(
        credential: &Credential,
        created_at: DateTime<Utc>,
    ) -> Result<Self, ContentError> {
        let secret = Secp256k1Secret::from_bytes(credential.secret_scalar())
            .map_err(|e| ContentError::MessageDecode(e.to_string()))?;
        let identity = DecryptionIdentity::undisclosed(created_at);
        let subkey = EcdhSubkey::new(
            secret,
            key_creation_time(identity.created_at),
            KdfParams::PUBLISHER,
        );
        Ok(Self { subkey, identity })
    }

    /// The ECDH subkey.
    pub fn subkey(&self) -> &EcdhSubkey {
        &self.subkey
    }

    /// Hex key id the publisher addresses the session key to.
    pub fn key_id(&self) -> String {
        hex::encode(self.subkey.key_id())
    }

    /// Identity metadata.
    pub fn identity(&self) -> &DecryptionIdentity {
        &self.identity
    }
}

impl fmt::Debug for DecryptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecryptionKey")
            .field("identity", &self.identity)
            .field("key_id", &self.key_id())
            .finish_non_exhaustive()
    }
}
