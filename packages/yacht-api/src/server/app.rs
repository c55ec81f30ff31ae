//! Application setup and server configuration.

use std::any::Any;
use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use listing_ingest::{ListingPipeline, PipelineError};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{self, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::server::routes::{extract_handler, health_handler, hello_handler};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<dyn ListingPipeline>,
}

/// Build the router around any pipeline.
pub fn build_app(pipeline: Arc<dyn ListingPipeline>) -> Router {
    let app_state = AppState { pipeline };

    // Browser clients on any origin; no cookies are ever involved.
    let cors = CorsLayer::new()
        .allow_origin(cors::Any)
        .allow_methods(cors::Any)
        .allow_headers(cors::Any);

    Router::new()
        .route("/extract-yacht-data/", post(extract_handler))
        .route("/extract-yacht-data", post(extract_handler))
        .route("/hello", get(hello_handler))
        .route("/health", get(health_handler))
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(Extension(app_state))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Turn a handler panic into the same failure body as any other
/// unclassified error.
fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };

    tracing::error!(panic = %detail, "Request handler panicked");

    let err = PipelineError::unexpected(format!("handler panicked: {}", detail));
    (StatusCode::INTERNAL_SERVER_ERROR, Json(err.descriptor())).into_response()
}
