//! [`AI`] over the OpenAI chat-completions API (`openai` feature).
//!
//! # Example
//!
//! ```rust,ignore
//! use funding_scout::ai::OpenAI;
//!
//! let ai = OpenAI::new("sk-...").with_model("gpt-4-turbo");
//! let orchestrator = ResearchOrchestrator::new(searcher, fetcher, ai);
//! ```

use async_trait::async_trait;
use openai_client::{ChatRequest, Message, OpenAIClient, RetryPolicy};

use crate::error::{Result, ScoutError};
use crate::traits::ai::AI;

/// Default chat model.
pub const DEFAULT_MODEL: &str = "gpt-4-turbo";

/// Low temperature keeps the agents close to the collected pages.
const DEFAULT_TEMPERATURE: f32 = 0.2;

/// Agent stages answered by OpenAI chat completions.
#[derive(Clone)]
pub struct OpenAI {
    client: OpenAIClient,
    model: String,
    temperature: Option<f32>,
}

impl OpenAI {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_client(OpenAIClient::new(api_key))
    }

    /// Key from `OPENAI_API_KEY`.
    pub fn from_env() -> Result<Self> {
        OpenAIClient::from_env()
            .map(Self::with_client)
            .map_err(|e| ScoutError::Config(e.to_string()))
    }

    fn with_client(client: OpenAIClient) -> Self {
        Self {
            client,
            model: DEFAULT_MODEL.to_string(),
            temperature: Some(DEFAULT_TEMPERATURE),
        }
    }

    /// Set the chat model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the sampling temperature (`None` for the provider default).
    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the retry policy for rate limits and server errors.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.client = self.client.with_retry_policy(retry);
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.client = self.client.with_base_url(url);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl AI for OpenAI {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String> {
        let request = ChatRequest::new(
            self.model.as_str(),
            vec![Message::system(system), Message::user(prompt)],
        )
        .with_temperature(self.temperature);

        let response = self
            .client
            .complete(&request)
            .await
            .map_err(ScoutError::ai)?;

        if let Some(usage) = &response.usage {
            tracing::debug!(
                model = %self.model,
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "OpenAI usage"
            );
        }

        Ok(response.content)
    }
}
