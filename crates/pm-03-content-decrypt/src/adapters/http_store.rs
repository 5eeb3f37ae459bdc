//! # HTTP Content Store

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::debug;

use crate::config::ContentConfig;
use crate::domain::ContentError;
use crate::ports::ContentStore;

/// Content store over HTTP: `GET {content_url}/{locator}`.
pub struct HttpContentStore {
    client: Client,
    config: ContentConfig,
}

impl HttpContentStore {
    /// Create a content store client.
    pub fn new(config: ContentConfig) -> Result<Self, ContentError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ContentError::ContentFetch(format!("http client: {e}")))?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl ContentStore for HttpContentStore {
    async fn fetch(&self, locator: &str) -> Result<Vec<u8>, ContentError> {
        let url = self.config.locator_url(locator);
        debug!("[pm-03] Fetching content {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ContentError::ContentFetch(format!("HTTP GET {url}: {e}")))?;

        if response.status() != StatusCode::OK {
            return Err(ContentError::ContentFetch(format!(
                "HTTP from {url} status: {}",
                response.status()
            )));
        }

        response
            .bytes()
            .await
            .map(|b| b.to_vec())
            .map_err(|e| ContentError::ContentFetch(format!("reading body from {url}: {e}")))
    }
}
