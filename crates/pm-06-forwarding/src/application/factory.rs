//! # Forwarder Factory
//!
//! Turns a forwarding document into a ready `MailForwarder`, and builds the
//! message used to try one out.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::info;

use crate::adapters::{HttpApiForwarder, SmtpForwarder};
use crate::config::ForwardConfig;
use shared_types::{ForwardError, ForwardRequest, MailForwarder, MailHeaders};

/// Sender of test messages.
pub const TEST_SENDER: &str = "test@example.com";

/// Build the forwarder described by `json`.
pub fn forwarder_from_json(json: &str) -> Result<Arc<dyn MailForwarder>, ForwardError> {
    let config = ForwardConfig::from_json(json)?;

    if let Some(api) = config.http_api_v1() {
        info!(url = %api.url, "[pm-06] HTTP API forwarder configured");
        return Ok(Arc::new(HttpApiForwarder::new(api.clone())?));
    }
    if let Some(smtp) = config.smtp_v1() {
        info!(relay = %smtp.address, "[pm-06] SMTP forwarder configured");
        return Ok(Arc::new(SmtpForwarder::new(smtp.clone())?));
    }

    Err(ForwardError::InvalidConfig(
        "no forwarding method defined".to_string(),
    ))
}

/// A test message stamped with `now`.
pub fn test_request(now: DateTime<Utc>) -> ForwardRequest {
    ForwardRequest {
        from: TEST_SENDER.to_string(),
        subject: format!("Testing 123 - {}", now.timestamp()),
        body: format!("This is a test email sent @: {}", now.to_rfc2822()),
        headers: MailHeaders::new(),
        is_test: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[tokio::test]
    async fn test_builds_each_kind() {
        let smtp = forwarder_from_json(
            r#"{"smtp":{"v1":{"to":["me@example.com"],"addr":"mail.example.com:25"}}}"#,
        )
        .unwrap();
        assert_eq!(smtp.kind(), "smtp");

        let api = forwarder_from_json(
            r#"{"http-api":{"v1":{"to":[],"url":"https://api.example.com","method":"POST"}}}"#,
        )
        .unwrap();
        assert_eq!(api.kind(), "http-api");
    }

    #[tokio::test]
    async fn test_http_api_wins_over_smtp() {
        let forwarder = forwarder_from_json(
            r#"{"smtp":{"v1":{"to":["me@example.com"],"addr":"mail.example.com:25"}},
                "http-api":{"v1":{"url":"https://api.example.com","method":"POST"}}}"#,
        )
        .unwrap();
        assert_eq!(forwarder.kind(), "http-api");
    }

    #[test]
    fn test_empty_document_is_rejected() {
        assert!(matches!(
            forwarder_from_json("{}"),
            Err(ForwardError::InvalidConfig(_))
        ));
        assert!(forwarder_from_json(r#"{"smtp":{}}"#).is_err());
    }

    #[test]
    fn test_test_request() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let request = test_request(now);
        assert_eq!(request.from, TEST_SENDER);
        assert_eq!(request.subject, "Testing 123 - 1709294400");
        assert!(request.body.starts_with("This is a test email sent @: Fri, "));
        assert!(request.body.ends_with("Mar 2024 12:00:00 +0000"));
        assert!(request.is_test);
        assert!(request.headers.is_empty());
    }
}
