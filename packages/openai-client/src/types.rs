//! Wire types for `POST /chat/completions`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }
}

/// Request body. Unset sampling options are left to the API defaults.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl ChatRequest {
    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            messages,
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// First choice of a completion, flattened.
#[derive(Debug, Clone)]
pub struct Completion {
    pub content: String,
    /// `stop`, `length`, ... as reported by the API.
    pub finish_reason: Option<String>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CompletionBody {
    #[serde(default)]
    pub choices: Vec<Choice>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Choice {
    pub message: Reply,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Assistant reply; `content` is null for refusals and tool calls.
#[derive(Debug, Deserialize)]
pub(crate) struct Reply {
    #[serde(default)]
    pub content: Option<String>,
}

impl CompletionBody {
    /// The first choice with text, or `None`.
    pub(crate) fn into_completion(self) -> Option<Completion> {
        let usage = self.usage;
        let choice = self.choices.into_iter().next()?;
        Some(Completion {
            content: choice.message.content?,
            finish_reason: choice.finish_reason,
            usage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let request = ChatRequest::new(
            "gpt-4-turbo",
            vec![Message::system("role"), Message::user("task")],
        );

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "gpt-4-turbo");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["role"], "user");
        assert!(json.get("temperature").is_none());

        let json = serde_json::to_value(request.with_temperature(Some(0.2))).unwrap();
        assert!(json.get("temperature").is_some());
    }

    #[test]
    fn test_null_content_yields_no_completion() {
        let body: CompletionBody = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":null},"finish_reason":"stop"}],"usage":null}"#,
        )
        .unwrap();
        assert!(body.into_completion().is_none());
    }

    #[test]
    fn test_completion_keeps_usage() {
        let body: CompletionBody = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":"Nom: A"},"finish_reason":"length"}],
                "usage":{"prompt_tokens":10,"completion_tokens":3,"total_tokens":13}}"#,
        )
        .unwrap();
        let completion = body.into_completion().unwrap();
        assert_eq!(completion.content, "Nom: A");
        assert_eq!(completion.finish_reason.as_deref(), Some("length"));
        assert_eq!(completion.usage.map(|u| u.total_tokens), Some(13));
    }
}
