//! # HTTP Feed Source
//!
//! `GET {feed_url}?page={n}&limit={size}` returning RSS or Atom.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::config::PollerConfig;
use crate::domain::FeedError;
use crate::ports::FeedSource;
use shared_types::FeedEntry;

/// Parse a syndication document into feed entries, in document order.
///
/// Items without a link keep an empty link; the checker rejects them.
pub fn parse_feed(body: &[u8]) -> Result<Vec<FeedEntry>, FeedError> {
    let feed = feed_rs::parser::parse(body).map_err(|e| FeedError::FeedParse(e.to_string()))?;

    Ok(feed
        .entries
        .into_iter()
        .map(|entry| {
            let link = entry
                .links
                .into_iter()
                .next()
                .map(|l| l.href)
                .unwrap_or_default();
            FeedEntry::new(entry.id, link)
        })
        .collect())
}

/// Feed source over HTTP.
pub struct HttpFeedSource {
    client: Client,
    base: Url,
}

impl HttpFeedSource {
    /// Create a feed client.
    pub fn new(config: &PollerConfig) -> Result<Self, FeedError> {
        let base = Url::parse(&config.feed_url)
            .map_err(|e| FeedError::FeedFetch(format!("invalid feed url {}: {e}", config.feed_url)))?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| FeedError::FeedFetch(format!("http client: {e}")))?;
        Ok(Self { client, base })
    }

    /// URL of one page.
    pub fn page_url(&self, page: u32, limit: usize) -> Url {
        let mut url = self.base.clone();
        url.query_pairs_mut()
            .append_pair("page", &page.to_string())
            .append_pair("limit", &limit.to_string());
        url
    }
}

#[async_trait]
impl FeedSource for HttpFeedSource {
    async fn fetch_page(&self, page: u32, limit: usize) -> Result<Vec<FeedEntry>, FeedError> {
        let url = self.page_url(page, limit);
        debug!(page, limit, "[pm-04] Fetching feed page");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| FeedError::FeedFetch(format!("HTTP GET {url}: {e}")))?;

        if response.status() != StatusCode::OK {
            return Err(FeedError::FeedFetch(format!(
                "HTTP from {url} status: {}",
                response.status()
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FeedError::FeedFetch(format!("reading body from {url}: {e}")))?;

        parse_feed(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>pubkemail</title>
    <link>https://rss.pubkemail.com/</link>
    <description>notifications</description>
    <item>
      <guid>item-2</guid>
      <link>https://pubkemail.com/m?check=aa&amp;hash=bb&amp;ts=2</link>
    </item>
    <item>
      <guid>GENESIS-ITEM</guid>
      <link>https://pubkemail.com/</link>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn test_parse_feed() {
        let entries = parse_feed(RSS.as_bytes()).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].guid, "item-2");
        assert_eq!(entries[0].link, "https://pubkemail.com/m?check=aa&hash=bb&ts=2");
        assert!(entries[1].is_genesis());
    }

    #[test]
    fn test_parse_garbage() {
        assert!(matches!(
            parse_feed(b"not a feed"),
            Err(FeedError::FeedParse(_))
        ));
    }

    #[test]
    fn test_page_url() {
        let source = HttpFeedSource::new(&PollerConfig::default()).unwrap();
        assert_eq!(
            source.page_url(3, 250).as_str(),
            "https://rss.pubkemail.com/feed?page=3&limit=250"
        );
    }

    #[test]
    fn test_invalid_feed_url() {
        let config = PollerConfig {
            feed_url: "not a url".to_string(),
            ..PollerConfig::default()
        };
        assert!(HttpFeedSource::new(&config).is_err());
    }
}
