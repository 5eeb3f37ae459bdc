//! # Domain Module
//!
//! Credential decoding and address derivation.

pub mod address;
pub mod errors;
pub mod wif;

pub use address::*;
pub use errors::*;
pub use wif::*;
