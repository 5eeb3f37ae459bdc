//! # PM-01 Key Derivation
//!
//! Turns a raw private-key credential into a [`Credential`]: the decoded
//! scalar, the derived address, the currency tag and the shared secret with
//! the directory's counterpart key.
//!
//! **Subsystem ID:** 1
//! **Architecture:** Hexagonal (Domain + Ports/Adapters)
//!
//! ## Derivation Flow
//!
//! ```text
//! WIF string ──base58check──▶ version | scalar | [0x01]
//!                                  │        │
//!                      CurrencyTag ◀┘        ▼
//!                                  public key (33/65 bytes)
//!                                       │          │
//!              testnet P2PKH address ◀──┘          ▼ last byte
//!                                         Key directory (256 buckets)
//!                                                  │
//!                                   counterpart point × scalar
//!                                                  ▼
//!                                            shared secret
//! ```
//!
//! ## Module Structure
//!
//! ```text
//! pm-01-key-derivation/
//! ├── domain/       # WIF decoding, address derivation, errors
//! ├── ports/        # KeyDerivationApi (inbound) + KeyDirectory (outbound)
//! ├── adapters/     # HTTP key directory with PEM/DER parsing
//! ├── application/  # KeyDerivationService
//! └── config.rs     # KeyDerivationConfig
//! ```
//!
//! A credential is derived once per subscription. Nothing here caches or
//! re-derives; the resulting `Credential` is immutable.
//!
//! [`Credential`]: shared_types::Credential

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

// Re-exports
pub use adapters::{parse_directory_response, HttpKeyDirectory};
pub use application::KeyDerivationService;
pub use config::KeyDerivationConfig;
pub use domain::{
    assemble_credential, derive_address, directory_bucket, DecodedWif, KeyDerivationError,
    TESTNET_P2PKH_VERSION,
};
pub use ports::{KeyDerivationApi, KeyDirectory, MockKeyDirectory};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
