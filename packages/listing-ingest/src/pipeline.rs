//! Orchestrator: location to structured listing, or one classified failure.
//!
//! Stages run strictly in order and the first failure ends the run. Each
//! run is independent, so one `Pipeline` can serve concurrent callers.

use std::fmt;
use std::time::Instant;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{info, warn};

use crate::error::PipelineError;
use crate::extract::ListingExtractor;
use crate::fetch::{Fetcher, RetryPolicy};
use crate::gate::{SizeGate, MAX_NORMALIZED_CHARS};
use crate::normalize::normalize;
use crate::traits::{backend::ExtractionBackend, transport::Transport};
use crate::types::{document::NormalizedText, listing::StructuredListing, location::Location};

/// Result of one pipeline run.
pub type PipelineOutcome = Result<StructuredListing, PipelineError>;

/// Pipeline stage, reported with failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Validating,
    Fetching,
    SizeChecking,
    Extracting,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validating => "validating",
            Self::Fetching => "fetching",
            Self::SizeChecking => "size_checking",
            Self::Extracting => "extracting",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tunables for one pipeline instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub retry: RetryPolicy,
    pub max_normalized_chars: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            max_normalized_chars: MAX_NORMALIZED_CHARS,
        }
    }
}

/// Fetch, normalize, gate, extract.
pub struct Pipeline<T, B> {
    fetcher: Fetcher<T>,
    gate: SizeGate,
    extractor: ListingExtractor<B>,
}

impl<T: Transport, B: ExtractionBackend> Pipeline<T, B> {
    pub fn new(transport: T, backend: B) -> Self {
        Self::with_config(transport, backend, PipelineConfig::default())
    }

    pub fn with_config(transport: T, backend: B, config: PipelineConfig) -> Self {
        Self {
            fetcher: Fetcher::new(transport).with_policy(config.retry),
            gate: SizeGate::new(config.max_normalized_chars),
            extractor: ListingExtractor::new(backend),
        }
    }

    pub fn fetcher(&self) -> &Fetcher<T> {
        &self.fetcher
    }

    pub fn gate(&self) -> &SizeGate {
        &self.gate
    }

    pub fn extractor(&self) -> &ListingExtractor<B> {
        &self.extractor
    }

    /// Full run for an unvalidated location string.
    pub async fn run(&self, input: &str) -> PipelineOutcome {
        let start = Instant::now();

        let result = self.run_stages(input).await;

        let elapsed_ms = start.elapsed().as_millis() as u64;
        match &result {
            Ok(listing) => info!(
                url = input,
                elapsed_ms,
                populated = listing.populated_fields(),
                "Listing pipeline succeeded"
            ),
            Err(e) => warn!(
                url = input,
                elapsed_ms,
                kind = %e.kind(),
                stage = e.stage().map(|s| s.as_str()).unwrap_or("unknown"),
                error = %e,
                "Listing pipeline failed"
            ),
        }

        result
    }

    async fn run_stages(&self, input: &str) -> PipelineOutcome {
        let location = Location::parse(input)?;
        let text = self.prepare(&location).await?;
        self.complete(&text).await
    }

    /// Fetch and normalize. Stops before the size check.
    pub async fn prepare(&self, location: &Location) -> Result<NormalizedText, PipelineError> {
        let document = self
            .fetcher
            .fetch(location)
            .await
            .map_err(|source| PipelineError::FetchUnavailable {
                url: location.to_string(),
                source,
            })?;

        Ok(normalize(&document))
    }

    /// Size check, then extraction. The backend is never called for text
    /// that fails the gate.
    pub async fn complete(&self, text: &NormalizedText) -> PipelineOutcome {
        self.gate.check(text)?;
        Ok(self.extractor.extract(text).await?)
    }
}

/// Object-safe entry point, so callers can hold any pipeline behind `Arc<dyn _>`.
#[async_trait]
pub trait ListingPipeline: Send + Sync {
    async fn run(&self, input: &str) -> PipelineOutcome;
}

#[async_trait]
impl<T, B> ListingPipeline for Pipeline<T, B>
where
    T: Transport + 'static,
    B: ExtractionBackend + 'static,
{
    async fn run(&self, input: &str) -> PipelineOutcome {
        Pipeline::run(self, input).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::testing::{MockBackend, MockTransport};
    use serde_json::json;
    use std::time::Duration;

    fn fast_config() -> PipelineConfig {
        PipelineConfig {
            retry: RetryPolicy::default().with_backoff_base(Duration::ZERO),
            ..Default::default()
        }
    }

    #[test]
    fn test_stage_names() {
        assert_eq!(Stage::SizeChecking.to_string(), "size_checking");
        assert_eq!(
            serde_json::to_value(Stage::Extracting).unwrap(),
            "extracting"
        );
    }

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.max_normalized_chars, 40_000);
        assert_eq!(config.retry.max_attempts, 5);
    }

    #[tokio::test]
    async fn test_prepare_returns_normalized_text() {
        let pipeline = Pipeline::with_config(
            MockTransport::page("<div><strong>Beneteau 49</strong></div><script>x</script>"),
            MockBackend::returning(json!({})),
            fast_config(),
        );
        let location = Location::parse("https://example.com/boat").unwrap();

        let text = pipeline.prepare(&location).await.unwrap();

        assert_eq!(text.as_str(), "Beneteau 49");
    }

    #[tokio::test]
    async fn test_complete_refuses_oversized_text() {
        let backend = MockBackend::returning(json!({}));
        let pipeline = Pipeline::with_config(
            MockTransport::page("unused"),
            backend.clone(),
            PipelineConfig {
                max_normalized_chars: 10,
                ..fast_config()
            },
        );

        let err = pipeline
            .complete(&NormalizedText::collapse("0123456789"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::ContentTooLarge);
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_usable_as_trait_object() {
        let pipeline: std::sync::Arc<dyn ListingPipeline> = std::sync::Arc::new(Pipeline::with_config(
            MockTransport::page("<p>Hanse 458</p>"),
            MockBackend::returning(json!({"brand": "Hanse", "model": "458"})),
            fast_config(),
        ));

        let listing = pipeline.run("https://example.com/hanse").await.unwrap();

        assert_eq!(listing.brand.as_deref(), Some("Hanse"));
        assert_eq!(listing.model.as_deref(), Some("458"));
    }
}
