//! Postmark-backed notifier.

use async_trait::async_trait;
use postmark_client::{PostmarkClient, PostmarkOptions};

use crate::error::{Result, ScoutError};
use crate::security::SecretString;
use crate::traits::notifier::Notifier;

/// Sender identity and server token for Postmark.
#[derive(Debug, Clone)]
pub struct PostmarkConfig {
    pub server_token: SecretString,
    pub from: String,
}

impl PostmarkConfig {
    pub fn new(server_token: impl Into<String>, from: impl Into<String>) -> Self {
        Self {
            server_token: SecretString::new(server_token),
            from: from.into(),
        }
    }
}

pub struct PostmarkNotifier {
    client: PostmarkClient,
}

impl PostmarkNotifier {
    /// Build a notifier, rejecting a blank token or sender up front.
    pub fn new(config: PostmarkConfig) -> Result<Self> {
        if config.server_token.is_blank() {
            return Err(ScoutError::Config("Postmark server token is empty".into()));
        }
        if config.from.trim().is_empty() {
            return Err(ScoutError::Config("email sender is empty".into()));
        }

        let client = PostmarkClient::new(PostmarkOptions {
            server_token: config.server_token.expose().to_string(),
            from: config.from,
        });
        Ok(Self { client })
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.client = self.client.with_base_url(url);
        self
    }
}

#[async_trait]
impl Notifier for PostmarkNotifier {
    async fn send(&self, subject: &str, body: &str, recipient: &str) -> Result<String> {
        if recipient.trim().is_empty() {
            return Err(ScoutError::Config("no email recipient configured".into()));
        }

        let sent = self
            .client
            .send_text(recipient.trim(), subject, body)
            .await
            .map_err(|e| ScoutError::Notify(e.into()))?;

        Ok(format!(
            "Email sent to {} ({})",
            recipient.trim(),
            sent.message_id.unwrap_or_else(|| "no message id".to_string())
        ))
    }
}
