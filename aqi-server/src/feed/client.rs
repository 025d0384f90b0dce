//! CPCB feed HTTP client.

use std::time::Duration;

use tracing::debug;

use super::FeedSource;
use super::error::FeedError;

/// Default URL of the CPCB CAAQMS RSS feed.
pub const DEFAULT_FEED_URL: &str = "https://airquality.cpcb.gov.in/caaqms/rss_feed";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Configuration for the feed client.
#[derive(Debug, Clone)]
pub struct FeedClientConfig {
    /// Feed URL
    pub url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// User-Agent header sent upstream
    pub user_agent: String,
}

impl FeedClientConfig {
    /// Create a config pointing at the public CPCB feed.
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self {
            url: DEFAULT_FEED_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: user_agent.into(),
        }
    }

    /// Set a custom feed URL (for testing or mirrors).
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// HTTP client for the station feed.
#[derive(Debug, Clone)]
pub struct FeedClient {
    http: reqwest::Client,
    url: String,
}

impl FeedClient {
    /// Create a new feed client.
    pub fn new(config: FeedClientConfig) -> Result<Self, FeedError> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            url: config.url,
        })
    }

    /// The URL this client fetches.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch the raw feed document.
    pub async fn fetch_document(&self) -> Result<String, FeedError> {
        debug!(url = %self.url, "requesting station feed");

        let response = self.http.get(&self.url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FeedError::Api {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        let body = response.text().await?;
        debug!(bytes = body.len(), "station feed received");

        Ok(body)
    }
}

impl FeedSource for FeedClient {
    async fn fetch(&self) -> Result<String, FeedError> {
        self.fetch_document().await
    }
}
