//! Web search for research keywords.
//!
//! Each keyword becomes a handful of candidate pages. Only the links matter
//! downstream; titles are kept for logs.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use crate::error::{BoxError, Result, ScoutError};
use crate::security::SearchCredentials;

const GOOGLE_SEARCH_URL: &str = "https://www.googleapis.com/customsearch/v1";

/// Google caps `num` at 10 per request.
const GOOGLE_MAX_NUM: usize = 10;

/// One link returned for a keyword.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub url: Url,
    pub title: String,
}

impl SearchResult {
    /// Parse `link`; `None` when it is not an absolute URL.
    pub fn parse(link: &str, title: impl Into<String>) -> Option<Self> {
        let url = Url::parse(link.trim()).ok()?;
        Some(Self {
            url,
            title: title.into(),
        })
    }
}

#[async_trait]
pub trait WebSearcher: Send + Sync {
    /// At most `limit` links for `query`, in ranking order.
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>>;
}

/// Canned links per query.
#[derive(Default)]
pub struct MockWebSearcher {
    links: RwLock<HashMap<String, Vec<SearchResult>>>,
    broken: RwLock<HashSet<String>>,
    queries: RwLock<Vec<String>>,
}

impl MockWebSearcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `query` with `urls`; unparseable entries are dropped.
    pub fn with_urls(self, query: &str, urls: &[&str]) -> Self {
        let results = urls
            .iter()
            .filter_map(|link| SearchResult::parse(link, ""))
            .collect();
        self.links.write().unwrap().insert(query.to_string(), results);
        self
    }

    /// Fail whenever `query` is searched.
    pub fn with_failure(self, query: &str) -> Self {
        self.broken.write().unwrap().insert(query.to_string());
        self
    }

    /// Queries searched so far.
    pub fn queries(&self) -> Vec<String> {
        self.queries.read().unwrap().clone()
    }
}

#[async_trait]
impl WebSearcher for MockWebSearcher {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>> {
        self.queries.write().unwrap().push(query.to_string());

        if self.broken.read().unwrap().contains(query) {
            return Err(ScoutError::Search {
                query: query.to_string(),
                source: "mock search failure".into(),
            });
        }

        let links = self.links.read().unwrap();
        Ok(links
            .get(query)
            .map(|found| found.iter().take(limit).cloned().collect())
            .unwrap_or_default())
    }
}

#[derive(Deserialize)]
struct CustomSearchPage {
    #[serde(default)]
    items: Vec<CustomSearchItem>,
}

#[derive(Deserialize)]
struct CustomSearchItem {
    link: String,
    #[serde(default)]
    title: String,
}

/// Google Programmable Search (Custom Search JSON API).
pub struct GoogleWebSearcher {
    credentials: SearchCredentials,
    http: reqwest::Client,
    endpoint: String,
}

impl GoogleWebSearcher {
    pub fn new(credentials: SearchCredentials) -> Self {
        Self {
            credentials,
            http: reqwest::Client::new(),
            endpoint: GOOGLE_SEARCH_URL.to_string(),
        }
    }

    /// Point at a different endpoint (testing).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    fn fail(query: &str, source: BoxError) -> ScoutError {
        ScoutError::Search {
            query: query.to_string(),
            source,
        }
    }
}

#[async_trait]
impl WebSearcher for GoogleWebSearcher {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>> {
        let num = limit.clamp(1, GOOGLE_MAX_NUM).to_string();

        // without_url(): the request URL carries the API key
        let resp = self
            .http
            .get(&self.endpoint)
            .query(&[
                ("key", self.credentials.api_key.expose()),
                ("cx", self.credentials.engine_id.as_str()),
                ("q", query),
                ("num", num.as_str()),
            ])
            .send()
            .await
            .map_err(|e| Self::fail(query, Box::new(e.without_url())))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Self::fail(query, format!("HTTP {}", status).into()));
        }

        let page: CustomSearchPage = resp
            .json()
            .await
            .map_err(|e| Self::fail(query, Box::new(e.without_url())))?;

        let results: Vec<SearchResult> = page
            .items
            .into_iter()
            .filter_map(|item| SearchResult::parse(&item.link, item.title))
            .take(limit)
            .collect();

        tracing::info!(query, links = results.len(), "Search complete");
        Ok(results)
    }
}
