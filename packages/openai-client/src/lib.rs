//! Minimal OpenAI REST API client
//!
//! A small client for the OpenAI chat completions API with no domain-specific
//! logic. It speaks one dialect: strict `json_schema` structured outputs.
//!
//! # Example
//!
//! ```rust,ignore
//! use openai_client::{OpenAIClient, StructuredOutput, StructuredRequest};
//! use schemars::JsonSchema;
//! use serde::Deserialize;
//!
//! #[derive(Deserialize, JsonSchema)]
//! struct Boat {
//!     name: Option<String>,
//!     year: Option<u16>,
//! }
//!
//! let client = OpenAIClient::from_env()?;
//! let request = StructuredRequest::new("gpt-4o-mini", system, user, Boat::openai_schema());
//! let json = client.structured_output(request).await?;
//! ```

pub mod error;
pub mod schema;
pub mod types;

pub use error::{OpenAIError, Result};
pub use schema::StructuredOutput;
pub use types::*;

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, warn};

/// Pure OpenAI API client.
#[derive(Clone)]
pub struct OpenAIClient {
    http_client: Client,
    api_key: String,
    base_url: String,
}

impl OpenAIClient {
    /// Create a new OpenAI client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http_client: Client::new(),
            api_key: api_key.into(),
            base_url: "https://api.openai.com/v1".to_string(),
        }
    }

    /// Create from environment variable `OPENAI_API_KEY`.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| OpenAIError::Config("OPENAI_API_KEY not set".into()))?;
        Ok(Self::new(api_key))
    }

    /// Set a custom base URL (for Azure, proxies, etc.).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Bound every request by `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| OpenAIError::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(self)
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Structured output with JSON schema.
    ///
    /// Uses OpenAI's `json_schema` response format for guaranteed valid JSON.
    /// Returns the raw JSON document produced by the model.
    pub async fn structured_output(&self, request: StructuredRequest) -> Result<String> {
        let start = std::time::Instant::now();

        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "OpenAI request failed");
                OpenAIError::Network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!(status = %status, error = %error_text, "OpenAI structured output error");
            return Err(OpenAIError::Api {
                status: status.as_u16(),
                message: error_text,
            });
        }

        let chat_response: types::ChatResponseRaw = response
            .json()
            .await
            .map_err(|e| OpenAIError::Parse(e.to_string()))?;

        if let Some(usage) = &chat_response.usage {
            debug!(
                model = %request.model,
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                duration_ms = start.elapsed().as_millis(),
                "OpenAI structured output"
            );
        }

        first_structured_content(chat_response)
    }
}

/// Pull the JSON document out of the first choice.
///
/// A refusal or a completion cut off by the token limit never carries a
/// usable document, so both surface as errors instead of half-parsed JSON.
fn first_structured_content(response: types::ChatResponseRaw) -> Result<String> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| OpenAIError::Parse("No choices in OpenAI response".into()))?;

    if let Some(refusal) = choice.message.refusal {
        return Err(OpenAIError::Refusal(refusal));
    }

    if let Some(reason) = choice.finish_reason.as_deref() {
        if reason == "length" || reason == "content_filter" {
            return Err(OpenAIError::Incomplete(reason.to_string()));
        }
    }

    choice
        .message
        .content
        .ok_or_else(|| OpenAIError::Parse("OpenAI response has no content".into()))
}
