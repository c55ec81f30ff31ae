use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use listing_ingest::testing::{MockBackend, MockTransport};
use listing_ingest::{
    ListingPipeline, Pipeline, PipelineConfig, PipelineOutcome, RetryPolicy,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use yacht_api::server::build_app;

fn app(transport: MockTransport, backend: MockBackend) -> Router {
    let pipeline = Pipeline::with_config(
        transport,
        backend,
        PipelineConfig {
            retry: RetryPolicy::default().with_backoff_base(Duration::ZERO),
            ..Default::default()
        },
    );
    build_app(Arc::new(pipeline))
}

fn extract_request(path: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// =============================================================================
// Tests: Extraction endpoint
// =============================================================================

#[tokio::test]
async fn test_extract_returns_flat_listing() {
    let app = app(
        MockTransport::page("<div><strong>Beneteau 49</strong></div>"),
        MockBackend::returning(json!({
            "yacht_name": "Beneteau 49",
            "price": 189000,
            "currency_three_letter_shortcut": "EUR",
            "equipment": ["Radar", "Autopilot"]
        })),
    );

    let response = app
        .oneshot(extract_request(
            "/extract-yacht-data/",
            r#"{"url": "https://example.com/beneteau-49"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["yacht_name"], "Beneteau 49");
    assert_eq!(body["price"], 189000.0);
    assert_eq!(body["currency_three_letter_shortcut"], "EUR");
    assert_eq!(body["equipment"], json!(["Radar", "Autopilot"]));
    assert!(body["brand"].is_null());
}

#[tokio::test]
async fn test_extract_without_trailing_slash() {
    let app = app(
        MockTransport::page("<p>Hanse 458</p>"),
        MockBackend::returning(json!({"brand": "Hanse"})),
    );

    let response = app
        .oneshot(extract_request(
            "/extract-yacht-data",
            r#"{"url": "https://example.com/hanse"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_invalid_url_is_422() {
    let transport = MockTransport::page("<p>unused</p>");
    let app = app(transport.clone(), MockBackend::returning(json!({})));

    let response = app
        .oneshot(extract_request("/extract-yacht-data/", r#"{"url": "not a url"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = json_body(response).await;
    assert_eq!(body["kind"], "invalid_location");
    assert_eq!(body["stage"], "validating");
    assert_eq!(transport.attempts(), 0);
}

#[tokio::test]
async fn test_malformed_body_is_invalid_location() {
    let app = app(MockTransport::page("<p>unused</p>"), MockBackend::returning(json!({})));

    let response = app
        .oneshot(extract_request("/extract-yacht-data/", r#"{"link": 5"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json_body(response).await["kind"], "invalid_location");
}

#[tokio::test]
async fn test_oversized_page_is_400_with_count_and_limit() {
    let backend = MockBackend::returning(json!({}));
    let app = app(
        MockTransport::page("x".repeat(45_000)),
        backend.clone(),
    );

    let response = app
        .oneshot(extract_request(
            "/extract-yacht-data/",
            r#"{"url": "https://example.com/huge"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["kind"], "content_too_large");
    assert_eq!(body["count"], 45_000);
    assert_eq!(body["limit"], 40_000);
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn test_unreachable_page_is_502() {
    let transport = MockTransport::timeout();
    let app = app(transport.clone(), MockBackend::returning(json!({})));

    let response = app
        .oneshot(extract_request(
            "/extract-yacht-data/",
            r#"{"url": "https://example.com/slow"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = json_body(response).await;
    assert_eq!(body["kind"], "fetch_unavailable");
    assert_eq!(body["attempts"], 5);
    assert_eq!(transport.attempts(), 5);
}

#[tokio::test]
async fn test_extraction_failure_is_502() {
    let app = app(
        MockTransport::page("<p>Bavaria 46</p>"),
        MockBackend::returning(json!("not an object")),
    );

    let response = app
        .oneshot(extract_request(
            "/extract-yacht-data/",
            r#"{"url": "https://example.com/bavaria"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(json_body(response).await["kind"], "extraction_unavailable");
}

struct PanickingPipeline;

#[async_trait]
impl ListingPipeline for PanickingPipeline {
    async fn run(&self, _input: &str) -> PipelineOutcome {
        panic!("parser blew up")
    }
}

#[tokio::test]
async fn test_panic_inside_run_is_unexpected() {
    let app = build_app(Arc::new(PanickingPipeline));

    let response = app
        .oneshot(extract_request(
            "/extract-yacht-data/",
            r#"{"url": "https://example.com/boat"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(body["kind"], "unexpected");
    assert!(body["stage"].is_null());
}

// =============================================================================
// Tests: Service endpoints
// =============================================================================

#[tokio::test]
async fn test_hello() {
    let app = app(MockTransport::status(404), MockBackend::returning(json!({})));

    let response = app
        .oneshot(Request::builder().uri("/hello").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({"message": "Hello from Yacht Data Extractor backend!"})
    );
}

#[tokio::test]
async fn test_health() {
    let app = app(MockTransport::status(404), MockBackend::returning(json!({})));

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({"status": "ok"}));
}

#[tokio::test]
async fn test_cors_allows_any_origin() {
    let app = app(MockTransport::status(404), MockBackend::returning(json!({})));

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/extract-yacht-data/")
                .header(header::ORIGIN, "https://frontend.example")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );
    assert!(response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS)
        .is_none());
}
