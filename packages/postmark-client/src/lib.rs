//! Pure Postmark transactional email client.
//!
//! Sends plain-text email through `POST /email`, authenticated with a
//! server token header.

pub mod error;
pub mod models;

pub use error::{PostmarkError, Result};
pub use models::{OutboundEmail, SendResponse};

use reqwest::{header, Client};

const BASE_URL: &str = "https://api.postmarkapp.com";
const TOKEN_HEADER: &str = "X-Postmark-Server-Token";

#[derive(Debug, Clone)]
pub struct PostmarkOptions {
    pub server_token: String,
    pub from: String,
}

#[derive(Clone)]
pub struct PostmarkClient {
    client: Client,
    options: PostmarkOptions,
    base_url: String,
}

impl PostmarkClient {
    pub fn new(options: PostmarkOptions) -> Self {
        Self {
            client: Client::new(),
            options,
            base_url: BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn sender(&self) -> &str {
        &self.options.from
    }

    /// Send a plain-text email from the configured sender.
    pub async fn send_text(&self, to: &str, subject: &str, body: &str) -> Result<SendResponse> {
        self.send(&OutboundEmail::text(&self.options.from, to, subject, body))
            .await
    }

    pub async fn send(&self, email: &OutboundEmail) -> Result<SendResponse> {
        if email.to.trim().is_empty() || !email.to.contains('@') {
            return Err(PostmarkError::InvalidEmail(email.to.clone()));
        }

        let mut headers = header::HeaderMap::new();
        headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));
        let token = header::HeaderValue::from_str(&self.options.server_token)
            .map_err(|_| PostmarkError::Config("server token is not a valid header value".into()))?;
        headers.insert(TOKEN_HEADER, token);

        let resp = self
            .client
            .post(format!("{}/email", self.base_url.trim_end_matches('/')))
            .headers(headers)
            .json(email)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        let parsed: Option<SendResponse> = serde_json::from_str(&body).ok();

        match parsed {
            Some(sent) if status.is_success() && sent.error_code == 0 => {
                tracing::info!(
                    to = %email.to,
                    message_id = sent.message_id.as_deref().unwrap_or_default(),
                    "Email sent"
                );
                Ok(sent)
            }
            Some(failed) => Err(PostmarkError::Api {
                status: status.as_u16(),
                code: failed.error_code,
                message: failed.message,
            }),
            None => Err(PostmarkError::Api {
                status: status.as_u16(),
                code: -1,
                message: body,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> PostmarkClient {
        PostmarkClient::new(PostmarkOptions {
            server_token: "server-token".into(),
            from: "scout@prod.fr".into(),
        })
    }

    #[tokio::test]
    async fn test_rejects_recipient_without_address() {
        let err = client().send_text("  ", "Subject", "Body").await.unwrap_err();
        assert!(matches!(err, PostmarkError::InvalidEmail(_)));
    }

    #[test]
    fn test_sender_and_base_url() {
        let c = client().with_base_url("http://localhost:9000/");
        assert_eq!(c.sender(), "scout@prod.fr");
        assert_eq!(c.base_url, "http://localhost:9000/");
    }
}
