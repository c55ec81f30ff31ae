//! OpenAI structured-output backend.
//!
//! # Example
//!
//! ```rust,ignore
//! use listing_ingest::ai::OpenAIBackend;
//!
//! let backend = OpenAIBackend::new("sk-...").with_model("gpt-4o");
//! let pipeline = Pipeline::new(transport, backend);
//! ```

use std::time::Duration;

use async_trait::async_trait;
use openai_client::{OpenAIClient, OpenAIError, StructuredOutput, StructuredRequest};
use tracing::debug;

use crate::error::BackendError;
use crate::traits::backend::{ExtractionBackend, ExtractionRequest};
use crate::types::listing::StructuredListing;

/// Pinned snapshot so extraction behavior does not drift under us.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini-2024-07-18";

const SCHEMA_NAME: &str = "yacht_listing";

/// Extraction through OpenAI's `json_schema` response format.
///
/// The schema is derived from [`StructuredListing`], so the model can only
/// answer with the listing's fields.
#[derive(Clone)]
pub struct OpenAIBackend {
    client: OpenAIClient,
    model: String,
}

impl OpenAIBackend {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_client(OpenAIClient::new(api_key))
    }

    pub fn with_client(client: OpenAIClient) -> Self {
        Self {
            client,
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Create from environment variable `OPENAI_API_KEY`.
    pub fn from_env() -> Result<Self, OpenAIError> {
        Ok(Self::with_client(OpenAIClient::from_env()?))
    }

    /// Set the chat model (default: gpt-4o-mini-2024-07-18).
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set a custom base URL (for Azure, proxies, etc.).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.client = self.client.with_base_url(url);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, OpenAIError> {
        self.client = self.client.with_timeout(timeout)?;
        Ok(self)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_request(&self, request: &ExtractionRequest) -> StructuredRequest {
        StructuredRequest::new(
            &self.model,
            &request.system,
            &request.user,
            StructuredListing::openai_schema(),
        )
        .with_schema_name(SCHEMA_NAME)
    }
}

#[async_trait]
impl ExtractionBackend for OpenAIBackend {
    async fn complete(
        &self,
        request: &ExtractionRequest,
    ) -> Result<serde_json::Value, BackendError> {
        debug!(model = %self.model, "Calling OpenAI structured output");

        let content = self
            .client
            .structured_output(self.build_request(request))
            .await?;

        serde_json::from_str(&content)
            .map_err(|e| BackendError::Malformed(format!("completion is not JSON: {}", e)))
    }

    fn name(&self) -> &str {
        "openai"
    }
}

impl From<OpenAIError> for BackendError {
    fn from(e: OpenAIError) -> Self {
        match e {
            OpenAIError::Refusal(reason) => Self::Refused(reason),
            OpenAIError::Parse(_) | OpenAIError::Incomplete(_) => Self::Malformed(e.to_string()),
            other => Self::Unavailable(other.to_string()),
        }
    }
}
