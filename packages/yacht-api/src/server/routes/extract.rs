use axum::{
    extract::{rejection::JsonRejection, Extension},
    Json,
};
use listing_ingest::{InvalidLocation, PipelineError, StructuredListing};
use serde::Deserialize;
use tracing::info;

use crate::server::app::AppState;
use crate::server::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct ExtractRequest {
    pub url: String,
}

/// Run the pipeline for one listing URL.
///
/// The run gets its own task so a panic anywhere inside it still comes back
/// as a classified `unexpected` failure.
pub async fn extract_handler(
    Extension(state): Extension<AppState>,
    payload: Result<Json<ExtractRequest>, JsonRejection>,
) -> Result<Json<StructuredListing>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        PipelineError::from(InvalidLocation {
            input: String::new(),
            reason: rejection.body_text(),
        })
    })?;

    info!(url = %request.url, "Extraction requested");

    let pipeline = state.pipeline.clone();
    let url = request.url;
    let listing = tokio::spawn(async move { pipeline.run(&url).await })
        .await
        .map_err(PipelineError::unexpected)??;

    Ok(Json(listing))
}
