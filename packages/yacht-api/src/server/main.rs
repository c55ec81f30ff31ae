// Main entry point for API server

use std::sync::Arc;

use anyhow::{Context, Result};
use yacht_api::{server::build_app, telemetry, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    telemetry::init();

    tracing::info!("Starting Yacht Data Extractor API");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(
        model = %config.openai_model,
        max_chars = config.max_normalized_chars,
        fetch_attempts = config.fetch_max_attempts,
        "Configuration loaded"
    );

    // Build application
    let pipeline = config.build_pipeline()?;
    let app = build_app(Arc::new(pipeline));

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
