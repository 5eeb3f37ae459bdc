//! # Forwarding Configuration
//!
//! The JSON documents users submit to define a forwarder.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use shared_types::ForwardError;

/// Wrapper selecting a configuration version.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Versioned<T> {
    /// Version 1.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub v1: Option<T>,
}

/// Relay delivery, version 1.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmtpConfigV1 {
    /// Envelope recipients.
    #[serde(default)]
    pub to: Vec<String>,
    /// Relay user (needs `pass`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    /// Relay password (needs `user`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pass: Option<String>,
    /// Relay `host:port`.
    #[serde(rename = "addr")]
    pub address: String,

    /// Test-only sender override.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub from: String,
    /// Test-only subject override.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub subject: String,
    /// Test-only body override.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub body: String,
}

/// Webhook delivery, version 1.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpApiConfigV1 {
    /// Recipients, informational for the remote API.
    #[serde(default)]
    pub to: Vec<String>,
    /// Basic-auth user (needs `pass`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    /// Basic-auth password (needs `user`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pass: Option<String>,
    /// Endpoint.
    pub url: String,
    /// HTTP method.
    pub method: String,
    /// Header templates.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// Parameter templates; each name may repeat.
    #[serde(default)]
    pub parameters: BTreeMap<String, Vec<String>>,

    /// Test-only sender override.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub from: String,
    /// Test-only subject override.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub subject: String,
    /// Test-only text override.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text: String,
    /// Test-only HTML override.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub html: String,
}

/// Top-level forwarding document. Only one transport is used; `http-api`
/// wins when both are present.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForwardConfig {
    /// Relay delivery.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub smtp: Option<Versioned<SmtpConfigV1>>,
    /// Webhook delivery.
    #[serde(default, rename = "http-api", skip_serializing_if = "Option::is_none")]
    pub http_api: Option<Versioned<HttpApiConfigV1>>,
}

impl ForwardConfig {
    /// Parse a forwarding document.
    pub fn from_json(json: &str) -> Result<Self, ForwardError> {
        serde_json::from_str(json).map_err(|e| ForwardError::InvalidConfig(e.to_string()))
    }

    /// The HTTP-API v1 section, if any.
    pub fn http_api_v1(&self) -> Option<&HttpApiConfigV1> {
        self.http_api.as_ref().and_then(|v| v.v1.as_ref())
    }

    /// The SMTP v1 section, if any.
    pub fn smtp_v1(&self) -> Option<&SmtpConfigV1> {
        self.smtp.as_ref().and_then(|v| v.v1.as_ref())
    }
}

/// Registry key for a user-supplied forwarder name.
pub fn normalize_name(name: &str) -> String {
    name.trim().replace(' ', "-")
}
