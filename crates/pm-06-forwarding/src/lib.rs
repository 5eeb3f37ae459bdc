//! # PM-06 Forwarding
//!
//! Concrete implementations of the `MailForwarder` port.
//!
//! **Subsystem ID:** 6
//! **Architecture:** Adapters over the shared forwarding port
//!
//! ## Configuration
//!
//! A forwarder is described by a small versioned JSON document:
//!
//! ```text
//! {"smtp":     {"v1": {"to": [...], "addr": "host:port", "user": .., "pass": ..}}}
//! {"http-api": {"v1": {"to": [...], "url": .., "method": .., "headers": {..}, "parameters": {..}}}}
//! ```
//!
//! HTTP-API header and parameter values are templates over
//! `{{.From}}`, `{{.Subject}}`, `{{.Text}}` and `{{.HTML}}`.
//!
//! Forwarding errors are reported to the caller and never retried here.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;

// Re-exports
pub use adapters::{HttpApiForwarder, SmtpForwarder};
pub use application::{forwarder_from_json, test_request, TEST_SENDER};
pub use config::{normalize_name, ForwardConfig, HttpApiConfigV1, SmtpConfigV1, Versioned};
pub use domain::{extract_alternative, parse_media_type, render_template, TemplateData};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
