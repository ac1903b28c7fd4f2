use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::StatusCode;
use std::time::Duration;

use crate::error::Error;

const MAX_REASON_LEN: usize = 200;

/// How a failed request should be handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    /// Network errors, timeouts and 5xx: retry with backoff.
    Transient,
    /// HTTP 429: wait, then retry once.
    RateLimited { retry_after: Option<Duration> },
    /// Anything else: give up immediately.
    Terminal,
}

#[derive(Debug, Clone)]
pub struct Failure {
    pub kind: FailureKind,
    pub status: Option<u16>,
    pub reason: String,
}

impl Failure {
    pub fn from_status(status: StatusCode, headers: &HeaderMap, body: &str) -> Self {
        let kind = if status == StatusCode::TOO_MANY_REQUESTS {
            FailureKind::RateLimited {
                retry_after: retry_after(headers),
            }
        } else if status.is_server_error() || status == StatusCode::REQUEST_TIMEOUT {
            FailureKind::Transient
        } else {
            FailureKind::Terminal
        };

        let body = body.trim();
        let reason = if body.is_empty() {
            status.to_string()
        } else {
            format!("{} - {}", status, truncate(body, MAX_REASON_LEN))
        };

        Self {
            kind,
            status: Some(status.as_u16()),
            reason,
        }
    }

    pub fn from_transport(err: &reqwest::Error) -> Self {
        let kind = if err.is_builder() {
            FailureKind::Terminal
        } else {
            FailureKind::Transient
        };

        Self {
            kind,
            status: err.status().map(|s| s.as_u16()),
            reason: err.to_string(),
        }
    }

    pub fn terminal(reason: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Terminal,
            status: None,
            reason: reason.into(),
        }
    }

    pub fn into_error(self, attempts: u32) -> Error {
        Error::retrieval(attempts, self.status, self.reason)
    }
}

/// Bounded retry with linear backoff.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts per request, including the first.
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Delay before the retry that follows failed attempt number `attempt`
    /// (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt)
    }

    pub fn should_retry(&self, failed_attempts: u32) -> bool {
        failed_attempts < self.max_attempts
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(2))
    }
}

fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(max_chars).collect();
    truncated.push_str("...");
    truncated
}
