//! Extraction backend trait: the external text-to-record capability.

use async_trait::async_trait;
use serde::Serialize;

use crate::error::BackendError;

/// Instruction plus page text, as handed to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractionRequest {
    /// Fixed system instruction
    pub system: String,

    /// User message carrying the normalized text
    pub user: String,
}

impl ExtractionRequest {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
        }
    }
}

/// Schema-constrained extraction capability.
///
/// Returns the record as raw JSON; shaping and validating it into a
/// `StructuredListing` is the caller's job, so a backend can never hand
/// back a partially trusted record.
#[async_trait]
pub trait ExtractionBackend: Send + Sync {
    async fn complete(&self, request: &ExtractionRequest) -> Result<serde_json::Value, BackendError>;

    /// Backend name (for logging/debugging).
    fn name(&self) -> &str {
        "unknown"
    }
}
