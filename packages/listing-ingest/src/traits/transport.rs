//! Transport trait for the single outbound GET the Fetcher makes.

use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use crate::error::TransportError;

/// What came back from one GET.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status code
    pub status: u16,

    /// Response body (empty for non-success statuses)
    pub body: String,

    /// Location after redirects, when the transport follows them
    pub final_url: Option<String>,

    /// Server-requested delay before retrying (`Retry-After`)
    pub retry_after: Option<Duration>,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            final_url: None,
            retry_after: None,
        }
    }

    pub fn with_retry_after(mut self, delay: Duration) -> Self {
        self.retry_after = Some(delay);
        self
    }

    pub fn with_final_url(mut self, url: impl Into<String>) -> Self {
        self.final_url = Some(url.into());
        self
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// One HTTP GET per call. Retry policy lives in the Fetcher, not here.
///
/// Implementations:
/// - `ReqwestTransport` - production client with browser-like headers
/// - `MockTransport` - scripted replies for tests
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &Url) -> Result<TransportResponse, TransportError>;

    /// Transport name (for logging/debugging).
    fn name(&self) -> &str {
        "unknown"
    }
}
