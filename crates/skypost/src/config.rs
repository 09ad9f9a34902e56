//! Client configuration.

use std::time::Duration;

use crate::types::ServiceUrl;

/// Default bound on a single request, connection through body.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Settings for an [`ApiClient`](crate::ApiClient).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the XRPC service.
    pub service: ServiceUrl,
    /// Per-request timeout; expiry surfaces as a network error.
    pub timeout: Duration,
    /// Retry policy for idempotent reads.
    pub retry: RetryPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            service: ServiceUrl::default(),
            timeout: DEFAULT_TIMEOUT,
            retry: RetryPolicy::none(),
        }
    }
}

impl ClientConfig {
    /// Configuration for `service` with default timeout and no retries.
    pub fn new(service: ServiceUrl) -> Self {
        Self {
            service,
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

/// Bounded exponential backoff for transient network failures.
///
/// Only applied to profile fetches. Post creation is not idempotent and is
/// never retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts after the first one.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub initial_backoff: Duration,
    /// Upper bound on any single delay.
    pub max_backoff: Duration,
}

impl RetryPolicy {
    /// Surface every failure on the first attempt.
    pub const fn none() -> Self {
        Self {
            max_retries: 0,
            initial_backoff: Duration::from_millis(250),
            max_backoff: Duration::from_secs(4),
        }
    }

    /// Retry up to `max_retries` times with the default backoff curve.
    pub const fn retries(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Self::none()
        }
    }

    /// Delay before retry number `retry` (1-based).
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry.saturating_sub(1));
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::none()
    }
}
