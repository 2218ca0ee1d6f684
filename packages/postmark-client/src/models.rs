use serde::{Deserialize, Serialize};

/// Outbound email payload.
/// See: https://postmarkapp.com/developer/api/email-api
#[derive(Debug, Clone, Serialize)]
pub struct OutboundEmail {
    #[serde(rename = "From")]
    pub from: String,
    #[serde(rename = "To")]
    pub to: String,
    #[serde(rename = "Subject")]
    pub subject: String,
    #[serde(rename = "TextBody")]
    pub text_body: String,
    #[serde(rename = "MessageStream", skip_serializing_if = "Option::is_none")]
    pub message_stream: Option<String>,
}

impl OutboundEmail {
    pub fn text(
        from: impl Into<String>,
        to: impl Into<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            subject: subject.into(),
            text_body: body.into(),
            message_stream: None,
        }
    }

    pub fn with_stream(mut self, stream: impl Into<String>) -> Self {
        self.message_stream = Some(stream.into());
        self
    }
}

/// Postmark's answer to a send request.
///
/// Failures carry a non-zero `ErrorCode` and no `MessageID`.
#[derive(Debug, Clone, Deserialize)]
pub struct SendResponse {
    #[serde(rename = "To", default)]
    pub to: Option<String>,
    #[serde(rename = "SubmittedAt", default)]
    pub submitted_at: Option<String>,
    #[serde(rename = "MessageID", default)]
    pub message_id: Option<String>,
    #[serde(rename = "ErrorCode")]
    pub error_code: i64,
    #[serde(rename = "Message")]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outbound_field_names() {
        let email = OutboundEmail::text("scout@prod.fr", "team@prod.fr", "Hello", "Body");
        let json = serde_json::to_value(&email).unwrap();
        assert_eq!(json["From"], "scout@prod.fr");
        assert_eq!(json["TextBody"], "Body");
        assert!(json.get("MessageStream").is_none());

        let json = serde_json::to_value(email.with_stream("outbound")).unwrap();
        assert_eq!(json["MessageStream"], "outbound");
    }

    #[test]
    fn test_send_response_parses_failure() {
        let resp: SendResponse = serde_json::from_str(
            r#"{"ErrorCode":300,"Message":"Invalid 'To' address: 'nope'."}"#,
        )
        .unwrap();
        assert_eq!(resp.error_code, 300);
        assert!(resp.message_id.is_none());
    }
}
