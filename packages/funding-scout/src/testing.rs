//! Testing utilities including mock implementations.
//!
//! These are useful for exercising the research pipeline and the run report
//! without making real LLM or email calls. Search and content mocks live next
//! to their traits.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, RwLock};

use crate::error::{Result, ScoutError};
use crate::traits::{ai::AI, notifier::Notifier};

pub use crate::traits::content::MockContentFetcher;
pub use crate::traits::searcher::MockWebSearcher;

/// A mock AI implementation for testing.
///
/// Replies are served in order; once exhausted the default reply is used.
#[derive(Default)]
pub struct MockAI {
    /// Queued replies
    replies: Arc<RwLock<VecDeque<String>>>,

    /// Reply used when the queue is empty
    default_reply: String,

    /// Fail every call
    failing: bool,

    /// Call tracking for assertions
    calls: Arc<RwLock<Vec<MockAICall>>>,
}

/// Record of a call made to the mock AI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockAICall {
    pub system: String,
    pub prompt: String,
}

impl MockAI {
    /// Create a new mock AI answering with empty text.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply.
    pub fn with_reply(self, reply: impl Into<String>) -> Self {
        self.replies.write().unwrap().push_back(reply.into());
        self
    }

    /// Reply used once the queue is exhausted.
    pub fn with_default_reply(mut self, reply: impl Into<String>) -> Self {
        self.default_reply = reply.into();
        self
    }

    /// Make every call fail.
    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    /// Calls made so far.
    pub fn calls(&self) -> Vec<MockAICall> {
        self.calls.read().unwrap().clone()
    }
}

#[async_trait]
impl AI for MockAI {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String> {
        self.calls.write().unwrap().push(MockAICall {
            system: system.to_string(),
            prompt: prompt.to_string(),
        });

        if self.failing {
            return Err(ScoutError::ai("mock AI failure"));
        }

        Ok(self
            .replies
            .write()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.default_reply.clone()))
    }
}

/// A sent message captured by [`MockNotifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub subject: String,
    pub body: String,
    pub recipient: String,
}

/// A mock notifier that records messages instead of sending them.
#[derive(Default)]
pub struct MockNotifier {
    sent: Arc<RwLock<Vec<SentMessage>>>,
    failing: bool,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every send fail.
    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    /// Messages sent so far.
    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.read().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn send(&self, subject: &str, body: &str, recipient: &str) -> Result<String> {
        if self.failing {
            return Err(ScoutError::Notify("mock notifier failure".into()));
        }
        if recipient.trim().is_empty() {
            return Err(ScoutError::Config("no recipient configured".to_string()));
        }

        self.sent.write().unwrap().push(SentMessage {
            subject: subject.to_string(),
            body: body.to_string(),
            recipient: recipient.to_string(),
        });
        Ok(format!("mock message {} sent to {}", self.sent.read().unwrap().len(), recipient))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_ai_serves_queue_then_default() {
        let ai = MockAI::new().with_reply("first").with_default_reply("fallback");

        assert_eq!(ai.complete("sys", "a").await.unwrap(), "first");
        assert_eq!(ai.complete("sys", "b").await.unwrap(), "fallback");
        assert_eq!(ai.calls().len(), 2);
        assert_eq!(ai.calls()[1].prompt, "b");
    }

    #[tokio::test]
    async fn test_mock_ai_failure() {
        let ai = MockAI::new().failing();
        assert!(matches!(ai.complete("s", "p").await, Err(ScoutError::AI(_))));
    }

    #[tokio::test]
    async fn test_mock_notifier() {
        let notifier = MockNotifier::new();
        let outcome = notifier.send("Subject", "Body", "team@example.org").await.unwrap();

        assert!(outcome.contains("team@example.org"));
        assert_eq!(notifier.sent()[0].subject, "Subject");
        assert!(notifier.send("S", "B", " ").await.is_err());
    }
}
