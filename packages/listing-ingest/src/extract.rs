//! Extraction contract: normalized text in, validated listing out.

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::ExtractionError;
use crate::traits::backend::{ExtractionBackend, ExtractionRequest};
use crate::types::{document::NormalizedText, listing::StructuredListing};

/// Fixed instruction sent with every extraction.
pub const SYSTEM_INSTRUCTION: &str = "Extract the yacht information from the HTML content. \
Don't write the currency, just write the number for the price. \
The equipment is probably listed under 'Features'.";

/// User message for one page.
pub fn user_prompt(text: &NormalizedText) -> String {
    format!("Extract yacht data from this HTML:\n\n{}", text)
}

/// Sends normalized text to an [`ExtractionBackend`] and checks the answer
/// against the listing schema.
pub struct ListingExtractor<B> {
    backend: B,
}

impl<B: ExtractionBackend> ListingExtractor<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// One backend call; no retry at this layer.
    pub async fn extract(&self, text: &NormalizedText) -> Result<StructuredListing, ExtractionError> {
        let request = ExtractionRequest::new(SYSTEM_INSTRUCTION, user_prompt(text));

        debug!(
            backend = self.backend.name(),
            chars = text.char_count(),
            "Requesting listing extraction"
        );

        let record = self.backend.complete(&request).await.map_err(|e| {
            warn!(backend = self.backend.name(), error = %e, "Extraction backend failed");
            ExtractionError::from(e)
        })?;

        let listing = validate_record(record)?;

        info!(
            backend = self.backend.name(),
            populated = listing.populated_fields(),
            yacht_name = listing.yacht_name.as_deref().unwrap_or("-"),
            "Listing extracted"
        );

        Ok(listing)
    }
}

/// Shape and check a raw record.
///
/// Must be a JSON object. Missing or null fields become `None`, unknown keys
/// are ignored, wrong types and impossible values are errors.
pub fn validate_record(record: Value) -> Result<StructuredListing, ExtractionError> {
    if !record.is_object() {
        return Err(ExtractionError::Schema(serde::de::Error::custom(format!(
            "expected a JSON object, got {}",
            json_type(&record)
        ))));
    }

    let listing: StructuredListing =
        serde_json::from_value(record).map_err(ExtractionError::Schema)?;
    listing.validate()?;
    Ok(listing)
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
