//! # HTTP-API Forwarder
//!
//! Delivers mail to a webhook-style API. Header and parameter values are
//! rendered from templates over the message fields.

use async_trait::async_trait;
use reqwest::multipart::Form;
use reqwest::{Client, Method, Request, StatusCode};
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::config::HttpApiConfigV1;
use crate::domain::{extract_alternative, parse_media_type, render_template, TemplateData};
use shared_types::{ForwardError, ForwardRequest, MailForwarder};

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Delivery through an HTTP API.
pub struct HttpApiForwarder {
    config: HttpApiConfigV1,
    client: Client,
    url: Url,
    method: Method,
}

impl HttpApiForwarder {
    /// Validate the URL and method and build the client.
    pub fn new(config: HttpApiConfigV1) -> Result<Self, ForwardError> {
        let url = Url::parse(&config.url)
            .map_err(|e| ForwardError::InvalidConfig(format!("url {:?}: {e}", config.url)))?;
        let method = Method::from_bytes(config.method.trim().to_ascii_uppercase().as_bytes())
            .map_err(|_| ForwardError::InvalidConfig(format!("method {:?}", config.method)))?;
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| ForwardError::InvalidConfig(format!("http client: {e}")))?;

        Ok(Self {
            config,
            client,
            url,
            method,
        })
    }

    /// Template values for one message.
    ///
    /// Real mail sent as `multipart/alternative` exposes its text and HTML
    /// parts; test sends take the configured overrides instead.
    pub fn template_data(&self, request: &ForwardRequest) -> TemplateData {
        let mut data = TemplateData {
            from: request.from.clone(),
            subject: request.subject.clone(),
            text: request.body.clone(),
            html: String::new(),
        };

        if request.is_test {
            let overrides = [
                (&self.config.from, &mut data.from),
                (&self.config.subject, &mut data.subject),
                (&self.config.text, &mut data.text),
                (&self.config.html, &mut data.html),
            ];
            for (value, field) in overrides {
                if !value.is_empty() {
                    field.clone_from(value);
                }
            }
        } else {
            let (text, html) = extract_alternative(request.headers.get("Content-Type"), &request.body);
            if let Some(text) = text {
                data.text = text;
            }
            if let Some(html) = html {
                data.html = html;
            }
        }

        data
    }

    /// The request that would be sent for `request`.
    pub fn build_request(&self, request: &ForwardRequest) -> Result<Request, ForwardError> {
        let data = self.template_data(request);
        let mut builder = self.client.request(self.method.clone(), self.url.clone());

        if let (Some(user), Some(pass)) = (&self.config.user, &self.config.pass) {
            builder = builder.basic_auth(user, Some(pass));
        }

        let mut use_multipart = false;
        for (name, template) in &self.config.headers {
            let value = render_template(template, &data)?;
            if name.eq_ignore_ascii_case("content-type")
                && parse_media_type(&value).0 == "multipart/form-data"
            {
                // The form sets its own content type with the boundary.
                use_multipart = true;
                continue;
            }
            builder = builder.header(name.as_str(), value);
        }

        let mut params = Vec::new();
        for (name, templates) in &self.config.parameters {
            for template in templates {
                params.push((name.clone(), render_template(template, &data)?));
            }
        }

        builder = if use_multipart {
            let form = params
                .into_iter()
                .fold(Form::new(), |form, (name, value)| form.text(name, value));
            builder.multipart(form)
        } else if self.method == Method::GET {
            builder.query(&params)
        } else {
            builder.form(&params)
        };

        builder
            .build()
            .map_err(|e| ForwardError::InvalidConfig(format!("request: {e}")))
    }
}

#[async_trait]
impl MailForwarder for HttpApiForwarder {
    async fn forward(&self, request: ForwardRequest) -> Result<(), ForwardError> {
        let http_request = self.build_request(&request)?;
        debug!(method = %self.method, url = %self.url, "[pm-06] Calling forwarding API");

        let response = self
            .client
            .execute(http_request)
            .await
            .map_err(|e| ForwardError::Transport(e.to_string()))?;

        if response.status() != StatusCode::OK {
            return Err(ForwardError::Rejected {
                status: response.status().as_u16(),
            });
        }
        Ok(())
    }

    fn kind(&self) -> &'static str {
        "http-api"
    }
}
