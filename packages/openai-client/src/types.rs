//! OpenAI API request and response types.

use serde::{Deserialize, Serialize};

// =============================================================================
// Messages
// =============================================================================

/// Chat message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Role: "system", "user", "assistant"
    pub role: String,

    /// Message content
    pub content: String,
}

impl Message {
    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Token usage statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usage {
    /// Tokens in the prompt
    pub prompt_tokens: u32,

    /// Tokens in the completion
    pub completion_tokens: u32,

    /// Total tokens used
    pub total_tokens: u32,
}

// =============================================================================
// Structured Output
// =============================================================================

/// Structured output request with JSON schema.
#[derive(Debug, Serialize)]
pub struct StructuredRequest {
    /// Model to use
    pub model: String,

    /// Conversation messages
    pub messages: Vec<Message>,

    /// Temperature
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Response format with JSON schema
    pub response_format: ResponseFormat,
}

impl StructuredRequest {
    /// Create a new structured request.
    pub fn new(
        model: impl Into<String>,
        system: impl Into<String>,
        user: impl Into<String>,
        schema: serde_json::Value,
    ) -> Self {
        Self {
            model: model.into(),
            messages: vec![Message::system(system), Message::user(user)],
            temperature: Some(0.0),
            response_format: ResponseFormat {
                format_type: "json_schema".to_string(),
                json_schema: JsonSchemaFormat {
                    name: "structured_response".to_string(),
                    strict: true,
                    schema,
                },
            },
        }
    }

    /// Name the schema (shown to the model, must match `^[a-zA-Z0-9_-]+$`).
    pub fn with_schema_name(mut self, name: impl Into<String>) -> Self {
        self.response_format.json_schema.name = name.into();
        self
    }
}

#[derive(Debug, Serialize)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub format_type: String,
    pub json_schema: JsonSchemaFormat,
}

#[derive(Debug, Serialize)]
pub struct JsonSchemaFormat {
    pub name: String,
    pub strict: bool,
    pub schema: serde_json::Value,
}

// =============================================================================
// Responses
// =============================================================================

/// Raw chat response from API (for internal parsing).
#[derive(Debug, Deserialize)]
pub(crate) struct ChatResponseRaw {
    pub choices: Vec<ChatChoice>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatChoice {
    pub message: ChatMessageResponse,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Structured outputs answer either with `content` or with a `refusal`.
#[derive(Debug, Deserialize)]
pub(crate) struct ChatMessageResponse {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub refusal: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_constructors() {
        let sys = Message::system("You are helpful");
        assert_eq!(sys.role, "system");

        let user = Message::user("Hello");
        assert_eq!(user.role, "user");
    }

    #[test]
    fn test_structured_request_serializes_strict_schema() {
        let req = StructuredRequest::new(
            "gpt-4o-mini",
            "system",
            "user",
            serde_json::json!({"type": "object"}),
        )
        .with_schema_name("yacht_listing");

        let body = serde_json::to_value(&req).unwrap();
        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "user");
        assert_eq!(body["response_format"]["type"], "json_schema");
        assert_eq!(body["response_format"]["json_schema"]["name"], "yacht_listing");
        assert_eq!(body["response_format"]["json_schema"]["strict"], true);
    }

    #[test]
    fn test_refusal_response_parses_without_content() {
        let raw: ChatResponseRaw = serde_json::from_value(serde_json::json!({
            "choices": [{
                "message": {"role": "assistant", "content": null, "refusal": "I can't help"},
                "finish_reason": "stop"
            }]
        }))
        .unwrap();

        let choice = &raw.choices[0];
        assert!(choice.message.content.is_none());
        assert_eq!(choice.message.refusal.as_deref(), Some("I can't help"));
        assert!(raw.usage.is_none());
    }
}
