//! reqwest-backed transport that presents itself as a desktop browser.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{self, HeaderMap, HeaderValue};
use url::Url;

use crate::error::TransportError;
use crate::traits::transport::{Transport, TransportResponse};

/// Per-attempt deadline covering connect and response.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

const MAX_REDIRECTS: usize = 5;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Header set sent with every request.
///
/// Many listing sites refuse obvious bots, so this mirrors a plain
/// navigation from a search result.
pub fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::USER_AGENT, HeaderValue::from_static(USER_AGENT));
    headers.insert(
        header::ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(
        header::ACCEPT_LANGUAGE,
        HeaderValue::from_static("en-US,en;q=0.5"),
    );
    headers.insert(
        header::REFERER,
        HeaderValue::from_static("https://www.google.com/"),
    );
    headers.insert(header::DNT, HeaderValue::from_static("1"));
    headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
    headers.insert(
        header::UPGRADE_INSECURE_REQUESTS,
        HeaderValue::from_static("1"),
    );
    headers.insert("sec-fetch-dest", HeaderValue::from_static("document"));
    headers.insert("sec-fetch-mode", HeaderValue::from_static("navigate"));
    headers.insert("sec-fetch-site", HeaderValue::from_static("cross-site"));
    headers.insert("sec-fetch-user", HeaderValue::from_static("?1"));
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("max-age=0"));
    headers
}

/// Live HTTP transport.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .default_headers(browser_headers())
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(|e| TransportError::Other(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// Wrap an already configured client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, url: &Url) -> Result<TransportResponse, TransportError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(classify)?;

        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let retry_after = parse_retry_after(response.headers());

        // Error pages are never normalized, so their bodies are not worth reading.
        if !response.status().is_success() {
            let mut reply = TransportResponse::new(status, String::new()).with_final_url(final_url);
            reply.retry_after = retry_after;
            return Ok(reply);
        }

        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Body(e.to_string()))?;

        Ok(TransportResponse::new(status, body).with_final_url(final_url))
    }

    fn name(&self) -> &str {
        "reqwest"
    }
}

fn classify(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout(e.to_string())
    } else if e.is_redirect() {
        TransportError::Redirect(e.to_string())
    } else if e.is_connect() {
        TransportError::Connect(e.to_string())
    } else if e.is_body() || e.is_decode() {
        TransportError::Body(e.to_string())
    } else {
        TransportError::Other(e.to_string())
    }
}

/// `Retry-After` in delta-seconds form. HTTP-date values are ignored.
fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}
