//! # Adapters
//!
//! One `MailForwarder` per transport.

pub mod http_api;
pub mod smtp;

pub use http_api::HttpApiForwarder;
pub use smtp::SmtpForwarder;
