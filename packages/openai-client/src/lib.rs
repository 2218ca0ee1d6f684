//! Pure OpenAI chat-completions client.
//!
//! No domain logic: one request in, the first choice out. Rate limits,
//! server errors and network failures are retried with exponential backoff.
//!
//! # Example
//!
//! ```rust,ignore
//! use openai_client::{ChatRequest, Message, OpenAIClient};
//!
//! let client = OpenAIClient::from_env()?;
//! let request = ChatRequest::new(
//!     "gpt-4-turbo",
//!     vec![Message::system("Tu es chercheur"), Message::user("Aides documentaires ?")],
//! );
//! let completion = client.complete(&request).await?;
//! ```

pub mod error;
pub mod types;

pub use error::{OpenAIError, Result};
pub use types::{ChatRequest, Completion, Message, Role, Usage};

use std::time::{Duration, Instant};

use reqwest::Client;
use types::CompletionBody;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Retry behaviour for retryable failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry; doubled on each further retry.
    pub initial_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Never retry.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            initial_backoff: Duration::ZERO,
        }
    }

    /// Delay before retry number `retry` (0-based).
    pub fn backoff(&self, retry: u32) -> Duration {
        self.initial_backoff.saturating_mul(2u32.saturating_pow(retry))
    }
}

#[derive(Clone)]
pub struct OpenAIClient {
    http: Client,
    api_key: String,
    base_url: String,
    retry: RetryPolicy,
}

impl OpenAIClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            retry: RetryPolicy::default(),
        }
    }

    /// Read the key from `OPENAI_API_KEY`.
    pub fn from_env() -> Result<Self> {
        match std::env::var("OPENAI_API_KEY") {
            Ok(key) if !key.trim().is_empty() => Ok(Self::new(key)),
            _ => Err(OpenAIError::Config("OPENAI_API_KEY is not set".into())),
        }
    }

    /// Azure deployments, proxies and test servers.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send `request`, retrying per the client's [`RetryPolicy`].
    pub async fn complete(&self, request: &ChatRequest) -> Result<Completion> {
        let mut attempt = 0;
        loop {
            let err = match self.send(request).await {
                Ok(completion) => return Ok(completion),
                Err(err) => err,
            };
            if !err.is_retryable() || attempt >= self.retry.max_retries {
                return Err(err);
            }

            let delay = self.retry.backoff(attempt);
            tracing::warn!(
                error = %err,
                attempt = attempt + 1,
                delay_ms = delay.as_millis() as u64,
                "Retrying chat completion"
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    async fn send(&self, request: &ChatRequest) -> Result<Completion> {
        let started = Instant::now();
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));

        let resp = self
            .http
            .post(url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| OpenAIError::Network(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(OpenAIError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: CompletionBody = resp
            .json()
            .await
            .map_err(|e| OpenAIError::Parse(e.to_string()))?;
        let completion = body
            .into_completion()
            .ok_or_else(|| OpenAIError::Parse("completion has no text content".into()))?;

        tracing::debug!(
            model = %request.model,
            elapsed_ms = started.elapsed().as_millis() as u64,
            finish_reason = completion.finish_reason.as_deref().unwrap_or("unknown"),
            "Chat completion received"
        );
        Ok(completion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_overrides() {
        let client = OpenAIClient::new("sk-test")
            .with_base_url("http://localhost:8089/v1")
            .with_retry_policy(RetryPolicy::none());

        assert_eq!(client.base_url(), "http://localhost:8089/v1");
        assert_eq!(client.retry, RetryPolicy::none());
    }

    #[tokio::test]
    async fn test_unreachable_host_is_network_error() {
        let client = OpenAIClient::new("sk-test")
            .with_base_url("http://127.0.0.1:9")
            .with_retry_policy(RetryPolicy::none());
        let request = ChatRequest::new("gpt-4-turbo", vec![Message::user("ping")]);

        let err = client.complete(&request).await.unwrap_err();
        assert!(matches!(err, OpenAIError::Network(_)));
    }

    #[test]
    fn test_backoff_doubles() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff(0), Duration::from_secs(1));
        assert_eq!(policy.backoff(1), Duration::from_secs(2));
        assert_eq!(policy.backoff(2), Duration::from_secs(4));
    }
}
