//! HTTP-based browser implementation.
//!
//! Fetches pages with a plain HTTP GET. Suitable for markup that is served
//! pre-rendered; a JavaScript-capable backend can be plugged in through the
//! same `BrowserClient` trait.

use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{FetchError, FetchResult};
use crate::traits::browser::{BrowserClient, FetchedPage};
use crate::types::config::IngestConfig;

/// Browser that fetches pages over HTTP.
///
/// # Example
///
/// ```rust,ignore
/// use listing_ingest::browsers::HttpBrowser;
///
/// let browser = HttpBrowser::new()?.with_user_agent("my-agent/1.0");
/// let page = browser.fetch("https://reno.craigslist.org/search/tla").await?;
/// ```
pub struct HttpBrowser {
    client: reqwest::Client,
    user_agent: String,
}

impl HttpBrowser {
    /// Create a browser with a 30 second timeout.
    pub fn new() -> FetchResult<Self> {
        Self::with_timeout(Duration::from_secs(30))
    }

    /// Create a browser from ingestion configuration.
    pub fn from_config(config: &IngestConfig) -> FetchResult<Self> {
        Ok(Self::with_timeout(Duration::from_secs(config.request_timeout_secs))?
            .with_user_agent(config.user_agent.clone()))
    }

    fn with_timeout(timeout: Duration) -> FetchResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(|e| FetchError::Http {
                url: String::new(),
                source: Box::new(e),
            })?;

        Ok(Self {
            client,
            user_agent: IngestConfig::default().user_agent,
        })
    }

    /// Set a custom user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set a custom HTTP client.
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }
}

#[async_trait]
impl BrowserClient for HttpBrowser {
    async fn fetch(&self, url: &str) -> FetchResult<FetchedPage> {
        url::Url::parse(url).map_err(|_| FetchError::InvalidUrl {
            url: url.to_string(),
        })?;

        debug!(url = %url, "HTTP fetch starting");
        let response = self
            .client
            .get(url)
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .header(
                reqwest::header::ACCEPT,
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .send()
            .await
            .map_err(|e| {
                warn!(url = %url, error = %e, "HTTP request failed");
                FetchError::Http {
                    url: url.to_string(),
                    source: Box::new(e),
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let html = response.text().await.map_err(|e| FetchError::Http {
            url: url.to_string(),
            source: Box::new(e),
        })?;

        if html.trim().is_empty() {
            return Err(FetchError::Navigation {
                url: url.to_string(),
                reason: "empty response body".to_string(),
            });
        }

        debug!(url = %url, bytes = html.len(), "HTTP fetch complete");
        Ok(FetchedPage::new(url, html))
    }

    fn name(&self) -> &str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rejects_invalid_url() {
        let browser = HttpBrowser::new().unwrap();
        let err = browser.fetch("not a url").await.unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl { .. }));
    }

    #[test]
    fn test_from_config_uses_user_agent() {
        let config = IngestConfig {
            user_agent: "test-agent/1.0".to_string(),
            ..IngestConfig::default()
        };
        let browser = HttpBrowser::from_config(&config).unwrap();
        assert_eq!(browser.user_agent, "test-agent/1.0");
        assert_eq!(browser.name(), "http");
    }
}
