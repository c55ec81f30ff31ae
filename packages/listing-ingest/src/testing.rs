//! Testing utilities including mock implementations.
//!
//! Useful for exercising the pipeline, or anything built on it, without
//! network access or model calls.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use url::Url;

use crate::error::{BackendError, TransportError};
use crate::traits::{
    backend::{ExtractionBackend, ExtractionRequest},
    transport::{Transport, TransportResponse},
};

/// One scripted transport outcome.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// 200 with this body
    Page(String),

    /// This status with an empty body
    Status(u16),

    /// This status plus a `Retry-After` delay
    StatusRetryAfter(u16, Duration),

    /// Fully specified response
    Response(TransportResponse),

    /// Transport-level failure
    Fail(TransportError),
}

/// A mock transport that plays back scripted replies.
///
/// Replies are served in order; once the script runs out the last reply
/// repeats. Clones share the script and the attempt counter.
#[derive(Clone)]
pub struct MockTransport {
    replies: Arc<Vec<MockReply>>,
    attempts: Arc<AtomicUsize>,
    requested: Arc<RwLock<Vec<String>>>,
}

impl MockTransport {
    /// Serve the replies in order, repeating the last one.
    pub fn sequence(replies: Vec<MockReply>) -> Self {
        let replies = if replies.is_empty() {
            vec![MockReply::Status(404)]
        } else {
            replies
        };

        Self {
            replies: Arc::new(replies),
            attempts: Arc::new(AtomicUsize::new(0)),
            requested: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Always 200 with `body`.
    pub fn page(body: impl Into<String>) -> Self {
        Self::sequence(vec![MockReply::Page(body.into())])
    }

    /// Always `status`.
    pub fn status(status: u16) -> Self {
        Self::sequence(vec![MockReply::Status(status)])
    }

    /// Always times out.
    pub fn timeout() -> Self {
        Self::sequence(vec![MockReply::Fail(TransportError::Timeout(
            "operation timed out".into(),
        ))])
    }

    /// Number of `get` calls so far.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// URLs requested, in order.
    pub fn requested(&self) -> Vec<String> {
        self.requested
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get(&self, url: &Url) -> Result<TransportResponse, TransportError> {
        let index = self.attempts.fetch_add(1, Ordering::SeqCst);
        self.requested
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(url.to_string());

        let reply = self
            .replies
            .get(index)
            .or_else(|| self.replies.last())
            .cloned()
            .unwrap_or(MockReply::Status(404));

        match reply {
            MockReply::Page(body) => Ok(TransportResponse::new(200, body)),
            MockReply::Status(status) => Ok(TransportResponse::new(status, String::new())),
            MockReply::StatusRetryAfter(status, delay) => {
                Ok(TransportResponse::new(status, String::new()).with_retry_after(delay))
            }
            MockReply::Response(response) => Ok(response),
            MockReply::Fail(e) => Err(e),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// A mock extraction backend with a fixed answer.
///
/// Records every request so tests can assert on what was sent, or that
/// nothing was sent at all.
#[derive(Clone)]
pub struct MockBackend {
    result: Result<serde_json::Value, BackendError>,
    requests: Arc<RwLock<Vec<ExtractionRequest>>>,
}

impl MockBackend {
    /// Answer every request with `record`.
    pub fn returning(record: serde_json::Value) -> Self {
        Self {
            result: Ok(record),
            requests: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Fail every request with `error`.
    pub fn failing(error: BackendError) -> Self {
        Self {
            result: Err(error),
            requests: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Number of `complete` calls so far.
    pub fn calls(&self) -> usize {
        self.requests
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn last_request(&self) -> Option<ExtractionRequest> {
        self.requests
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .last()
            .cloned()
    }
}

#[async_trait]
impl ExtractionBackend for MockBackend {
    async fn complete(
        &self,
        request: &ExtractionRequest,
    ) -> Result<serde_json::Value, BackendError> {
        self.requests
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(request.clone());
        self.result.clone()
    }

    fn name(&self) -> &str {
        "mock"
    }
}
