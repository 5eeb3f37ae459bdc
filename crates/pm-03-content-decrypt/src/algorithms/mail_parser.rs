//! # RFC 822 Message Parsing
//!
//! Header block, a blank line, then the body. Folded header lines are joined
//! with a single space. Either CRLF or bare LF line endings are accepted.

use shared_types::{DecryptedMessage, MailHeaders};

use crate::domain::ContentError;

fn decode_error(detail: impl Into<String>) -> ContentError {
    ContentError::MessageDecode(detail.into())
}

fn valid_field_name(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(|b| b.is_ascii_graphic() && b != b':')
}

/// Parse a decrypted payload into headers and body.
pub fn parse_message(raw: &[u8]) -> Result<DecryptedMessage, ContentError> {
    let text = String::from_utf8_lossy(raw);
    let mut headers = MailHeaders::new();
    let mut pending: Option<(String, String)> = None;
    let mut rest: &str = &text;

    loop {
        let (line, remainder) = match rest.find('\n') {
            Some(i) => (&rest[..i], &rest[i + 1..]),
            None => (rest, ""),
        };
        let line = line.strip_suffix('\r').unwrap_or(line);
        rest = remainder;

        if line.is_empty() {
            break;
        }

        if line.starts_with([' ', '\t']) {
            let (_, value) = pending
                .as_mut()
                .ok_or_else(|| decode_error("continuation line before first header"))?;
            if !value.is_empty() {
                value.push(' ');
            }
            value.push_str(line.trim());
            continue;
        }

        if let Some((name, value)) = pending.take() {
            headers.append(name, value);
        }

        let (name, value) = line
            .split_once(':')
            .ok_or_else(|| decode_error(format!("malformed header line: {line:?}")))?;
        if !valid_field_name(name) {
            return Err(decode_error(format!("invalid header name: {name:?}")));
        }
        pending = Some((name.to_string(), value.trim().to_string()));
    }

    if let Some((name, value)) = pending {
        headers.append(name, value);
    }
    if headers.is_empty() {
        return Err(decode_error("message has no headers"));
    }

    Ok(DecryptedMessage {
        headers,
        body: rest.to_string(),
    })
}
