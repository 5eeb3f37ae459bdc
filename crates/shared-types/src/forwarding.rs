//! # Forwarding Port
//!
//! The abstract sink that delivers a decrypted message to a real mailbox or
//! webhook. The pipeline depends only on this trait; concrete transports live
//! in `pm-06-forwarding`.

use crate::entities::MailHeaders;
use crate::errors::ForwardError;
use async_trait::async_trait;

/// Everything a forwarder needs to deliver one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardRequest {
    /// Sender address as it appeared in the original mail.
    pub from: String,
    /// Subject line.
    pub subject: String,
    /// Raw body text.
    pub body: String,
    /// Original header fields.
    pub headers: MailHeaders,
    /// Test sends may substitute configured from/subject/body values.
    pub is_test: bool,
}

/// Forwarding capability - outbound port.
#[async_trait]
pub trait MailForwarder: Send + Sync {
    /// Deliver one message.
    async fn forward(&self, request: ForwardRequest) -> Result<(), ForwardError>;

    /// Short transport name for logging (`smtp`, `http-api`).
    fn kind(&self) -> &'static str;
}
