//! Failure-to-response mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use listing_ingest::{ErrorKind, PipelineError};

/// HTTP status for each failure kind.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::InvalidLocation => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::FetchUnavailable => StatusCode::BAD_GATEWAY,
        ErrorKind::ContentTooLarge => StatusCode::BAD_REQUEST,
        ErrorKind::ExtractionUnavailable => StatusCode::BAD_GATEWAY,
        ErrorKind::Unexpected => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// A pipeline failure on its way out of a handler.
#[derive(Debug)]
pub struct ApiError(pub PipelineError);

impl From<PipelineError> for ApiError {
    fn from(e: PipelineError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(self.0.kind());
        if status.is_server_error() {
            tracing::error!(error = %self.0, kind = %self.0.kind(), "Request failed");
        }
        (status, Json(self.0.descriptor())).into_response()
    }
}
