//! # Field Templates
//!
//! Header and parameter values may reference the message fields as
//! `{{.From}}`, `{{.Subject}}`, `{{.Text}}` and `{{.HTML}}`. Anything else
//! inside braces is an error.

use shared_types::ForwardError;

/// Values available to templates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateData {
    /// Sender.
    pub from: String,
    /// Subject line.
    pub subject: String,
    /// Plain-text body.
    pub text: String,
    /// HTML body, empty when the message has none.
    pub html: String,
}

impl TemplateData {
    fn field(&self, name: &str) -> Option<&str> {
        match name {
            "From" => Some(&self.from),
            "Subject" => Some(&self.subject),
            "Text" => Some(&self.text),
            "HTML" => Some(&self.html),
            _ => None,
        }
    }
}

/// Substitute every `{{.Field}}` action in `template`.
pub fn render_template(template: &str, data: &TemplateData) -> Result<String, ForwardError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let end = after
            .find("}}")
            .ok_or_else(|| ForwardError::Template(format!("unclosed action in {template:?}")))?;

        let action = after[..end].trim();
        let value = action
            .strip_prefix('.')
            .and_then(|name| data.field(name))
            .ok_or_else(|| ForwardError::Template(format!("unknown field {action:?}")))?;
        out.push_str(value);

        rest = &after[end + 2..];
    }

    out.push_str(rest);
    Ok(out)
}
