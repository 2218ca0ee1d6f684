//! Page content extraction.
//!
//! Search results are turned into readable text by a content-extraction
//! service. The service is a plain HTTP API taking the target URL and an API
//! key as query parameters and answering `{"content": ..., "error": ...}`.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::RwLock;
use std::time::Duration;

use crate::error::{Result, ScoutError};
use crate::security::SecretString;

/// Fetches readable text for a URL.
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    /// Text content of the page, `None` when the service returned nothing.
    async fn fetch(&self, url: &str) -> Result<Option<String>>;
}

/// Content-extraction HTTP API client.
pub struct HttpContentApi {
    endpoint: String,
    api_key: SecretString,
    client: reqwest::Client,
}

impl HttpContentApi {
    /// Default request timeout.
    pub const TIMEOUT: Duration = Duration::from_secs(10);

    /// Create a client for `endpoint`.
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Self::TIMEOUT)
            .build()
            .map_err(|e| ScoutError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: endpoint.into(),
            api_key: SecretString::new(api_key),
            client,
        })
    }
}

#[async_trait]
impl ContentFetcher for HttpContentApi {
    async fn fetch(&self, url: &str) -> Result<Option<String>> {
        #[derive(serde::Deserialize)]
        struct Response {
            content: Option<String>,
            error: Option<String>,
        }

        let content_error = |source: crate::error::BoxError| ScoutError::Content {
            url: url.to_string(),
            source,
        };

        tracing::debug!(url, endpoint = %self.endpoint, "Fetching page content");

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("url", url), ("key", self.api_key.expose())])
            .send()
            .await
            .map_err(|e| content_error(Box::new(e.without_url())))?;

        let status = response.status();
        if !status.is_success() {
            return Err(content_error(format!("HTTP {}", status).into()));
        }

        let body: Response = response
            .json()
            .await
            .map_err(|e| content_error(Box::new(e.without_url())))?;

        match body.content.filter(|c| !c.trim().is_empty()) {
            Some(content) => {
                tracing::info!(url, chars = content.chars().count(), "Content extracted");
                Ok(Some(content))
            }
            None => {
                tracing::warn!(
                    url,
                    error = body.error.as_deref().unwrap_or("no content"),
                    "Empty content response"
                );
                Ok(None)
            }
        }
    }
}

/// Mock content fetcher for testing.
#[derive(Default)]
pub struct MockContentFetcher {
    pages: RwLock<HashMap<String, String>>,
    failing: RwLock<HashSet<String>>,
    calls: RwLock<Vec<String>>,
}

impl MockContentFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `content` for `url`.
    pub fn with_page(self, url: &str, content: &str) -> Self {
        self.pages
            .write()
            .unwrap()
            .insert(url.to_string(), content.to_string());
        self
    }

    /// Make fetching `url` fail.
    pub fn with_failure(self, url: &str) -> Self {
        self.failing.write().unwrap().insert(url.to_string());
        self
    }

    /// URLs fetched so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }
}

#[async_trait]
impl ContentFetcher for MockContentFetcher {
    async fn fetch(&self, url: &str) -> Result<Option<String>> {
        self.calls.write().unwrap().push(url.to_string());

        if self.failing.read().unwrap().contains(url) {
            return Err(ScoutError::Content {
                url: url.to_string(),
                source: "mock fetch failure".into(),
            });
        }
        Ok(self.pages.read().unwrap().get(url).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_content_fetcher() {
        let fetcher = MockContentFetcher::new()
            .with_page("https://www.cnc.fr/aides", "Aide au documentaire")
            .with_failure("https://down.example");

        assert_eq!(
            fetcher.fetch("https://www.cnc.fr/aides").await.unwrap().as_deref(),
            Some("Aide au documentaire")
        );
        assert_eq!(fetcher.fetch("https://other.example").await.unwrap(), None);
        assert!(fetcher.fetch("https://down.example").await.is_err());
        assert_eq!(fetcher.calls().len(), 3);
    }
}
