//! Bounded retry with exponential backoff.
//!
//! # Design
//! The policy only decides; the service loop does the waiting through its
//! [`Context`](crate::context::Context) so deadlines and cancellation apply
//! to backoff as well as to the attempts themselves.

use std::time::Duration;

use crate::error::{Error, TransportErrorKind};
use crate::http::{HttpMethod, HttpResponse};

/// Retries used when `enable_retries` is called with `0`.
pub const DEFAULT_MAX_RETRIES: u32 = 4;
/// Backoff cap used when `enable_retries` is called with a zero interval.
pub const DEFAULT_MAX_INTERVAL: Duration = Duration::from_secs(30);
/// Statuses treated as transient.
pub const RETRYABLE_STATUSES: [u16; 5] = [429, 500, 502, 503, 504];

const MIN_INTERVAL: Duration = Duration::from_secs(1);

/// What to do after an attempt did not succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Retry { delay: Duration },
    Fail,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub max_interval: Duration,
    pub min_interval: Duration,
    pub retry_on_status: Vec<u16>,
}

impl RetryPolicy {
    /// Zero for either argument selects the library default for it.
    pub fn new(max_retries: u32, max_interval: Duration) -> Self {
        let max_retries = if max_retries == 0 {
            DEFAULT_MAX_RETRIES
        } else {
            max_retries
        };
        let max_interval = if max_interval.is_zero() {
            DEFAULT_MAX_INTERVAL
        } else {
            max_interval
        };
        Self {
            max_retries,
            max_interval,
            min_interval: MIN_INTERVAL.min(max_interval),
            retry_on_status: RETRYABLE_STATUSES.to_vec(),
        }
    }

    pub fn with_min_interval(mut self, min_interval: Duration) -> Self {
        self.min_interval = min_interval.min(self.max_interval);
        self
    }

    /// `min_interval * 2^attempt`, capped at `max_interval`. `attempt` is 0-based.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.min_interval
            .checked_mul(factor)
            .unwrap_or(self.max_interval)
            .min(self.max_interval)
    }

    /// Decide after a response with status `response.status` arrived.
    pub fn on_response(&self, method: HttpMethod, response: &HttpResponse, attempt: u32) -> Decision {
        if attempt >= self.max_retries || !self.retry_on_status.contains(&response.status) {
            return Decision::Fail;
        }
        // A 429 means the request was refused unprocessed, so any method may retry.
        if !method.is_idempotent() && response.status != 429 {
            return Decision::Fail;
        }
        let delay = retry_after(response)
            .map(|d| d.min(self.max_interval))
            .unwrap_or_else(|| self.backoff(attempt));
        Decision::Retry { delay }
    }

    /// Decide after an attempt failed without a response.
    pub fn on_error(&self, method: HttpMethod, err: &Error, attempt: u32) -> Decision {
        if attempt >= self.max_retries {
            return Decision::Fail;
        }
        let Error::Transport { kind, .. } = err else {
            return Decision::Fail;
        };
        let retryable = match kind {
            TransportErrorKind::Connect => true,
            TransportErrorKind::Timeout | TransportErrorKind::Io => method.is_idempotent(),
            TransportErrorKind::Other => false,
        };
        if retryable {
            Decision::Retry {
                delay: self.backoff(attempt),
            }
        } else {
            Decision::Fail
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(0, Duration::ZERO)
    }
}

fn retry_after(response: &HttpResponse) -> Option<Duration> {
    response
        .header("Retry-After")
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}
