//! HTTP status fetcher.
//!
//! Queries the gateway's Kafka status route and decodes the JSON body.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use super::{ConnectionStatus, FetchError, StatusFetcher};

/// Route the gateway mounts the status handler under.
pub const DEFAULT_STATUS_PATH: &str = "/data/kafka/connections/status";

/// Default time to wait for the gateway before a fetch fails.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(4);

/// A fetcher that GETs the status document from a running gateway.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    url: String,
    description: String,
}

impl HttpFetcher {
    /// Create a fetcher for `base_url` using the default status path and timeout.
    pub fn new(base_url: &str) -> Result<Self, FetchError> {
        Self::builder().base_url(base_url).build()
    }

    /// Create a new builder for configuring the fetcher.
    pub fn builder() -> HttpFetcherBuilder {
        HttpFetcherBuilder::default()
    }

    /// Returns the full URL being polled.
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl StatusFetcher for HttpFetcher {
    async fn fetch(&self) -> Result<ConnectionStatus, FetchError> {
        let response = self.client.get(&self.url).send().await?.error_for_status()?;
        let status = response.json::<ConnectionStatus>().await?;
        Ok(status)
    }

    fn description(&self) -> &str {
        &self.description
    }
}

/// Builder for [`HttpFetcher`].
#[derive(Debug, Default)]
pub struct HttpFetcherBuilder {
    base_url: Option<String>,
    status_path: Option<String>,
    timeout: Option<Duration>,
}

impl HttpFetcherBuilder {
    /// Set the gateway base URL (e.g., "http://localhost:8088").
    pub fn base_url(mut self, base_url: &str) -> Self {
        self.base_url = Some(base_url.to_string());
        self
    }

    /// Set the status route path.
    ///
    /// Defaults to [`DEFAULT_STATUS_PATH`].
    pub fn status_path(mut self, path: &str) -> Self {
        self.status_path = Some(path.to_string());
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the fetcher.
    pub fn build(self) -> Result<HttpFetcher, FetchError> {
        let base_url = self.base_url.unwrap_or_else(|| "http://localhost:8088".to_string());
        let status_path = self.status_path.unwrap_or_else(|| DEFAULT_STATUS_PATH.to_string());
        let url = join_url(&base_url, &status_path);

        let client = Client::builder()
            .timeout(self.timeout.unwrap_or(DEFAULT_TIMEOUT))
            .build()?;

        Ok(HttpFetcher {
            client,
            description: format!("gateway: {}", base_url.trim_end_matches('/')),
            url,
        })
    }
}

/// Join a base URL and a path with exactly one slash between them.
fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}
