//! Fetcher: one location in, raw markup out, with bounded retry.
//!
//! Retries only transient outcomes: transport failures (timeouts, refused
//! connections, dropped bodies) and the statuses in
//! [`RetryPolicy::retry_statuses`]. Everything else fails on the first attempt.

mod http;

pub use http::{browser_headers, ReqwestTransport, DEFAULT_FETCH_TIMEOUT};

use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::error::FetchError;
use crate::traits::transport::Transport;
use crate::types::{document::RawDocument, location::Location};

/// Attempts per fetch, including the first.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Delay before the second attempt; doubles after each failure.
pub const DEFAULT_BACKOFF_BASE: Duration = Duration::from_millis(300);

/// Upper bound for any single delay, including `Retry-After`.
pub const DEFAULT_BACKOFF_CAP: Duration = Duration::from_secs(10);

/// Server-side statuses worth another try.
pub const RETRY_STATUSES: [u16; 5] = [429, 500, 502, 503, 504];

/// Statuses whose `Retry-After` header is honored.
pub const RETRY_AFTER_STATUSES: [u16; 2] = [429, 503];

/// Retry ceiling and backoff schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff_base: Duration,
    pub backoff_cap: Duration,
    pub retry_statuses: Vec<u16>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff_base: DEFAULT_BACKOFF_BASE,
            backoff_cap: DEFAULT_BACKOFF_CAP,
            retry_statuses: RETRY_STATUSES.to_vec(),
        }
    }
}

impl RetryPolicy {
    /// Set the attempt ceiling (at least one attempt is always made).
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Set the first backoff delay. `Duration::ZERO` disables sleeping.
    pub fn with_backoff_base(mut self, base: Duration) -> Self {
        self.backoff_base = base;
        self
    }

    pub fn with_backoff_cap(mut self, cap: Duration) -> Self {
        self.backoff_cap = cap;
        self
    }

    pub fn is_retryable_status(&self, status: u16) -> bool {
        self.retry_statuses.contains(&status)
    }

    /// Delay after failed attempt number `attempt` (1-based).
    ///
    /// `base * 2^(attempt-1)`, or the server's `Retry-After` when given
    /// (429 and 503 only), never above the cap.
    pub fn delay_for(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        let computed = match retry_after {
            Some(requested) => requested,
            None => {
                let exponent = attempt.saturating_sub(1).min(16);
                self.backoff_base.saturating_mul(1u32 << exponent)
            }
        };
        computed.min(self.backoff_cap)
    }
}

/// Fetches listing pages through a [`Transport`].
///
/// Holds no state between calls; concurrent fetches share nothing but the
/// transport.
pub struct Fetcher<T> {
    transport: T,
    policy: RetryPolicy,
}

impl<T: Transport> Fetcher<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            policy: RetryPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Fetch the page at `location`.
    ///
    /// Never panics past this boundary: every failure comes back as a
    /// [`FetchError`] carrying the last observed reason and the attempt count.
    pub async fn fetch(&self, location: &Location) -> Result<RawDocument, FetchError> {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            debug!(
                url = %location,
                attempt,
                max_attempts,
                transport = self.transport.name(),
                "Fetching listing page"
            );

            let (failure, retry_after) = match self.transport.get(location.as_url()).await {
                Ok(response) if response.is_success() => {
                    if response.body.trim().is_empty() {
                        warn!(url = %location, status = response.status, "Listing page has an empty body");
                        return Err(FetchError::EmptyBody {
                            status: response.status,
                            attempts: attempt,
                        });
                    }

                    info!(
                        url = %location,
                        status = response.status,
                        bytes = response.body.len(),
                        attempts = attempt,
                        "Listing page fetched"
                    );

                    return Ok(RawDocument {
                        url: location.to_string(),
                        final_url: response
                            .final_url
                            .unwrap_or_else(|| location.to_string()),
                        status: response.status,
                        body: response.body,
                        fetched_at: Utc::now(),
                    });
                }
                Ok(response) if self.policy.is_retryable_status(response.status) => (
                    FetchError::Status {
                        status: response.status,
                        attempts: attempt,
                    },
                    response
                        .retry_after
                        .filter(|_| RETRY_AFTER_STATUSES.contains(&response.status)),
                ),
                Ok(response) => {
                    warn!(url = %location, status = response.status, "Non-retryable HTTP status");
                    return Err(FetchError::Status {
                        status: response.status,
                        attempts: attempt,
                    });
                }
                Err(e) if !e.is_transient() => {
                    warn!(url = %location, error = %e, "Non-retryable transport failure");
                    return Err(FetchError::Transport {
                        attempts: attempt,
                        source: e,
                    });
                }
                Err(e) => (
                    FetchError::Transport {
                        attempts: attempt,
                        source: e,
                    },
                    None,
                ),
            };

            if attempt >= max_attempts {
                warn!(url = %location, error = %failure, "Giving up on listing page");
                return Err(failure);
            }

            let delay = self.policy.delay_for(attempt, retry_after);
            warn!(
                url = %location,
                attempt,
                delay_ms = delay.as_millis() as u64,
                error = %failure,
                "Transient fetch failure, retrying"
            );
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }
    }
}
