//! AI trait for LLM operations.
//!
//! The research pipeline only needs free-text completion: each stage is a
//! system prompt (the agent's role) plus a user prompt (the task), and the
//! answer is passed on as-is.

use async_trait::async_trait;

use crate::error::Result;

/// AI trait for LLM operations.
///
/// Implementations wrap specific LLM providers and handle transport,
/// authentication and retries.
#[async_trait]
pub trait AI: Send + Sync {
    /// Complete `prompt` under the `system` role instructions.
    async fn complete(&self, system: &str, prompt: &str) -> Result<String>;
}

/// One stage of a multi-agent pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentStage {
    /// Short name used in logs.
    pub name: &'static str,
    /// Role instructions sent as the system prompt.
    pub system: String,
}

impl AgentStage {
    pub fn new(name: &'static str, system: impl Into<String>) -> Self {
        Self {
            name,
            system: system.into(),
        }
    }
}
