//! Typed errors for every pipeline stage.
//!
//! Component errors stay specific to their component. [`PipelineError`] is
//! the caller-facing taxonomy: five kinds, each with a stable code.

use serde::Serialize;
use thiserror::Error;

use crate::pipeline::Stage;

/// Input that is not an absolute http(s) URL with a host.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid location {input:?}: {reason}")]
pub struct InvalidLocation {
    pub input: String,
    pub reason: String,
}

/// A single transport attempt failed below the HTTP layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Connect or response deadline elapsed
    #[error("timed out: {0}")]
    Timeout(String),

    /// DNS, TCP or TLS failure
    #[error("connection failed: {0}")]
    Connect(String),

    /// Connection dropped while reading the body
    #[error("failed to read body: {0}")]
    Body(String),

    /// Redirect loop or too many redirects
    #[error("redirect error: {0}")]
    Redirect(String),

    /// Anything else reported by the HTTP client
    #[error("request failed: {0}")]
    Other(String),
}

impl TransportError {
    /// Timeouts, refused connections and dropped bodies may clear up.
    /// Redirect loops and malformed requests fail the same way every time.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::Connect(_) | Self::Body(_))
    }
}

/// The Fetcher gave up.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Last response carried a non-success status
    #[error("HTTP {status} after {attempts} attempt(s)")]
    Status { status: u16, attempts: u32 },

    /// Last attempt failed below the HTTP layer
    #[error("{source} after {attempts} attempt(s)")]
    Transport {
        attempts: u32,
        #[source]
        source: TransportError,
    },

    /// Success status with nothing to normalize
    #[error("HTTP {status} with an empty body")]
    EmptyBody { status: u16, attempts: u32 },
}

impl FetchError {
    /// Number of attempts made before giving up.
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Status { attempts, .. }
            | Self::Transport { attempts, .. }
            | Self::EmptyBody { attempts, .. } => *attempts,
        }
    }
}

/// Normalized text at or above the size limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("character count ({count}) exceeds the limit of {limit}")]
pub struct SizeExceeded {
    pub count: usize,
    pub limit: usize,
}

/// The extraction capability itself failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// Network, quota, or service-side failure
    #[error("extraction service unavailable: {0}")]
    Unavailable(String),

    /// The model declined to answer
    #[error("extraction service refused: {0}")]
    Refused(String),

    /// The completion is not a JSON document
    #[error("malformed completion: {0}")]
    Malformed(String),
}

/// The extraction contract was not met.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// Record is not an object or a field has the wrong type
    #[error("record does not match the listing schema: {0}")]
    Schema(#[source] serde_json::Error),

    /// Field has the right type but an impossible value
    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Machine-distinguishable failure kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidLocation,
    FetchUnavailable,
    ContentTooLarge,
    ExtractionUnavailable,
    Unexpected,
}

impl ErrorKind {
    /// Stable identifying code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidLocation => "invalid_location",
            Self::FetchUnavailable => "fetch_unavailable",
            Self::ContentTooLarge => "content_too_large",
            Self::ExtractionUnavailable => "extraction_unavailable",
            Self::Unexpected => "unexpected",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Terminal pipeline failure.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    InvalidLocation(#[from] InvalidLocation),

    #[error("failed to fetch {url}: {source}")]
    FetchUnavailable {
        url: String,
        #[source]
        source: FetchError,
    },

    #[error(transparent)]
    ContentTooLarge(#[from] SizeExceeded),

    #[error("extraction failed: {0}")]
    ExtractionUnavailable(#[from] ExtractionError),

    #[error("unexpected failure: {reason}")]
    Unexpected { reason: String },
}

impl PipelineError {
    /// Wrap a failure nobody classified.
    pub fn unexpected(reason: impl std::fmt::Display) -> Self {
        Self::Unexpected {
            reason: reason.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidLocation(_) => ErrorKind::InvalidLocation,
            Self::FetchUnavailable { .. } => ErrorKind::FetchUnavailable,
            Self::ContentTooLarge(_) => ErrorKind::ContentTooLarge,
            Self::ExtractionUnavailable(_) => ErrorKind::ExtractionUnavailable,
            Self::Unexpected { .. } => ErrorKind::Unexpected,
        }
    }

    /// Stage that failed; `None` when the failure was not classified.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::InvalidLocation(_) => Some(Stage::Validating),
            Self::FetchUnavailable { .. } => Some(Stage::Fetching),
            Self::ContentTooLarge(_) => Some(Stage::SizeChecking),
            Self::ExtractionUnavailable(_) => Some(Stage::Extracting),
            Self::Unexpected { .. } => None,
        }
    }

    /// Flatten into the shape returned to callers.
    pub fn descriptor(&self) -> FailureDescriptor {
        let mut descriptor = FailureDescriptor {
            kind: self.kind(),
            stage: self.stage(),
            detail: self.to_string(),
            count: None,
            limit: None,
            attempts: None,
        };

        match self {
            Self::ContentTooLarge(exceeded) => {
                descriptor.count = Some(exceeded.count);
                descriptor.limit = Some(exceeded.limit);
            }
            Self::FetchUnavailable { source, .. } => {
                descriptor.attempts = Some(source.attempts());
            }
            _ => {}
        }

        descriptor
    }
}

/// Failure as surfaced to the caller: stable kind plus free-text detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureDescriptor {
    pub kind: ErrorKind,
    pub stage: Option<Stage>,
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attempts: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_codes_are_distinct() {
        let kinds = [
            ErrorKind::InvalidLocation,
            ErrorKind::FetchUnavailable,
            ErrorKind::ContentTooLarge,
            ErrorKind::ExtractionUnavailable,
            ErrorKind::Unexpected,
        ];
        let codes: std::collections::HashSet<_> = kinds.iter().map(|k| k.code()).collect();
        assert_eq!(codes.len(), kinds.len());
    }

    #[test]
    fn test_kind_serializes_as_code() {
        for kind in [ErrorKind::ContentTooLarge, ErrorKind::FetchUnavailable] {
            assert_eq!(serde_json::to_value(kind).unwrap(), kind.code());
        }
    }

    #[test]
    fn test_content_too_large_descriptor() {
        let err = PipelineError::from(SizeExceeded {
            count: 45_000,
            limit: 40_000,
        });

        let descriptor = err.descriptor();
        assert_eq!(descriptor.kind, ErrorKind::ContentTooLarge);
        assert_eq!(descriptor.stage, Some(Stage::SizeChecking));
        assert_eq!(descriptor.count, Some(45_000));
        assert_eq!(descriptor.limit, Some(40_000));
        assert!(descriptor.detail.contains("45000"));
    }

    #[test]
    fn test_fetch_descriptor_carries_attempts_and_reason() {
        let err = PipelineError::FetchUnavailable {
            url: "https://example.com/boat".into(),
            source: FetchError::Transport {
                attempts: 5,
                source: TransportError::Timeout("deadline elapsed".into()),
            },
        };

        let descriptor = err.descriptor();
        assert_eq!(descriptor.kind, ErrorKind::FetchUnavailable);
        assert_eq!(descriptor.attempts, Some(5));
        assert!(descriptor.detail.contains("deadline elapsed"));

        let json = serde_json::to_value(&descriptor).unwrap();
        assert_eq!(json["kind"], "fetch_unavailable");
        assert_eq!(json["stage"], "fetching");
        assert!(json.get("count").is_none());
    }

    #[test]
    fn test_unexpected_has_no_stage() {
        let err = PipelineError::unexpected("task panicked");
        assert_eq!(err.kind(), ErrorKind::Unexpected);
        assert_eq!(err.stage(), None);
        assert_eq!(serde_json::to_value(err.descriptor()).unwrap()["stage"], serde_json::Value::Null);
    }

    #[test]
    fn test_only_network_failures_are_transient() {
        assert!(TransportError::Timeout("10s".into()).is_transient());
        assert!(TransportError::Connect("refused".into()).is_transient());
        assert!(TransportError::Body("reset".into()).is_transient());
        assert!(!TransportError::Redirect("loop".into()).is_transient());
        assert!(!TransportError::Other("builder error".into()).is_transient());
    }
}
