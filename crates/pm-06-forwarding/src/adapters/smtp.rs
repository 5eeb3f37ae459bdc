//! # SMTP Forwarder
//!
//! Relays the decrypted message as-is through a mail server, upgrading to
//! TLS when the server offers STARTTLS.

use async_trait::async_trait;
use lettre::address::Envelope;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{Address as MailAddress, AsyncSmtpTransport, AsyncTransport, Tokio1Executor};
use tracing::debug;

use crate::config::SmtpConfigV1;
use shared_types::{ForwardError, ForwardRequest, MailForwarder};

const DEFAULT_SMTP_PORT: u16 = 25;

fn split_host_port(address: &str) -> Result<(&str, u16), ForwardError> {
    match address.rsplit_once(':') {
        Some((host, port)) => {
            let port = port
                .parse()
                .map_err(|_| ForwardError::InvalidConfig(format!("bad port in {address:?}")))?;
            Ok((host, port))
        }
        None => Ok((address, DEFAULT_SMTP_PORT)),
    }
}

fn parse_mailbox(value: &str) -> Result<MailAddress, ForwardError> {
    value
        .trim()
        .parse::<Mailbox>()
        .map(|mailbox| mailbox.email)
        .map_err(|e| ForwardError::InvalidAddress(format!("{value:?}: {e}")))
}

/// Delivery through an SMTP relay.
pub struct SmtpForwarder {
    config: SmtpConfigV1,
    recipients: Vec<MailAddress>,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpForwarder {
    /// Validate the configuration and prepare the transport. No connection
    /// is made until the first message.
    pub fn new(config: SmtpConfigV1) -> Result<Self, ForwardError> {
        let (host, port) = split_host_port(&config.address)?;
        if host.is_empty() {
            return Err(ForwardError::InvalidConfig("missing relay host".to_string()));
        }

        let recipients = config
            .to
            .iter()
            .map(|to| parse_mailbox(to))
            .collect::<Result<Vec<_>, _>>()?;
        if recipients.is_empty() {
            return Err(ForwardError::InvalidConfig("no recipients".to_string()));
        }

        let tls = TlsParameters::new(host.to_string())
            .map_err(|e| ForwardError::InvalidConfig(format!("tls: {e}")))?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host)
            .port(port)
            .tls(Tls::Opportunistic(tls));
        if let (Some(user), Some(pass)) = (&config.user, &config.pass) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        Ok(Self {
            transport: builder.build(),
            recipients,
            config,
        })
    }

    /// Sender, subject and body after test overrides.
    fn effective<'a>(&'a self, request: &'a ForwardRequest) -> (&'a str, &'a str, &'a str) {
        let pick = |override_value: &'a str, value: &'a str| {
            if request.is_test && !override_value.is_empty() {
                override_value
            } else {
                value
            }
        };
        (
            pick(&self.config.from, &request.from),
            pick(&self.config.subject, &request.subject),
            pick(&self.config.body, &request.body),
        )
    }

    /// The raw message written to the relay.
    ///
    /// Original headers come first in their original order; `To`, `From`
    /// and `Subject` are written last.
    pub fn compose_message(&self, request: &ForwardRequest) -> String {
        let (from, subject, body) = self.effective(request);
        let to = self.config.to.join(", ");

        let mut message = String::new();
        for (name, value) in request.headers.iter() {
            if ["to", "from", "subject"].contains(&name.to_ascii_lowercase().as_str()) {
                continue;
            }
            message.push_str(&format!("{name}: {value}\r\n"));
        }

        for (name, fallback) in [("To", to.as_str()), ("From", from), ("Subject", subject)] {
            let value = match request.headers.get(name) {
                "" => fallback,
                value => value,
            };
            message.push_str(&format!("{name}: {value}\r\n"));
        }

        message.push_str("\r\n");
        message.push_str(body);
        message
    }
}

impl SmtpForwarder {
    /// SMTP envelope for `request`. A message without a sender gets the
    /// null reverse-path.
    fn envelope(&self, request: &ForwardRequest) -> Result<Envelope, ForwardError> {
        let (from, _, _) = self.effective(request);
        let sender = if from.trim().is_empty() {
            None
        } else {
            Some(parse_mailbox(from)?)
        };
        Envelope::new(sender, self.recipients.clone())
            .map_err(|e| ForwardError::InvalidAddress(e.to_string()))
    }
}

#[async_trait]
impl MailForwarder for SmtpForwarder {
    async fn forward(&self, request: ForwardRequest) -> Result<(), ForwardError> {
        let envelope = self.envelope(&request)?;
        let message = self.compose_message(&request);

        debug!(relay = %self.config.address, recipients = self.recipients.len(), "[pm-06] Relaying message");
        self.transport
            .send_raw(&envelope, message.as_bytes())
            .await
            .map_err(|e| ForwardError::Transport(e.to_string()))?;
        Ok(())
    }

    fn kind(&self) -> &'static str {
        "smtp"
    }
}
