use std::fmt;

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Closed set of failure categories surfaced by the request pipeline.
///
/// Every failed call produces exactly one [`Error`] carrying one of these
/// kinds. The string forms match the upstream client's error codes so logs
/// stay comparable across implementations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Connection or fetch-level failure.
    Network,
    /// A transport's own timeout fired.
    Timeout,
    /// Upstream signalled throttling (HTTP 429).
    RateLimit,
    /// Non-success status, or a failure message embedded in the payload.
    Api,
    /// Cross-origin failure, only reported for browser-like runtimes.
    Cors,
    /// Body was not JSON, or a date wrapper could not be parsed.
    Transform,
    /// Payload parsed but did not match the expected shape.
    InvalidResponse,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Network => "NETWORK_ERROR",
            Self::Timeout => "TIMEOUT_ERROR",
            Self::RateLimit => "RATE_LIMIT_ERROR",
            Self::Api => "API_ERROR",
            Self::Cors => "CORS_ERROR",
            Self::Transform => "TRANSFORM_ERROR",
            Self::InvalidResponse => "INVALID_RESPONSE",
        }
    }

    /// Returns `true` for kinds a caller may reasonably retry.
    ///
    /// Rate limits are retryable but should be paired with backoff; see
    /// [`Error::retry_after_secs`].
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::Network | Self::Timeout | Self::RateLimit)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The single error type returned by the request pipeline.
///
/// Created once per failed call, at the point where a raw transport or
/// parsing failure is classified. URLs stored here have the access code
/// redacted and are safe to log.
#[derive(Debug, Error)]
#[error("{kind} ({endpoint}): {message}")]
pub struct Error {
    kind: ErrorKind,
    message: String,
    endpoint: String,
    status: Option<u16>,
    url: Option<String>,
    retry_after_secs: Option<u64>,
    timestamp: DateTime<Utc>,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    pub fn new(kind: ErrorKind, endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            endpoint: endpoint.into(),
            status: None,
            url: None,
            retry_after_secs: None,
            timestamp: Utc::now(),
            source: None,
        }
    }

    #[must_use]
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    #[must_use]
    pub fn with_retry_after(mut self, secs: u64) -> Self {
        self.retry_after_secs = Some(secs);
        self
    }

    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Identifier of the endpoint whose call failed.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// HTTP status, when the failure came with one.
    pub fn status(&self) -> Option<u16> {
        self.status
    }

    /// Request URL with credentials redacted.
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// Seconds the upstream asked us to wait, from a `Retry-After` header.
    pub fn retry_after_secs(&self) -> Option<u64> {
        self.retry_after_secs
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }

    /// Returns `true` if the upstream rejected the access code.
    pub fn is_auth_failure(&self) -> bool {
        self.kind == ErrorKind::Api
            && (matches!(self.status, Some(401 | 403))
                || self.message.to_ascii_lowercase().contains("access code"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_kind_and_endpoint() {
        let err = Error::new(ErrorKind::Api, "vessels.vesselLocations", "HTTP 500").with_status(500);
        assert_eq!(
            err.to_string(),
            "API_ERROR (vessels.vesselLocations): HTTP 500"
        );
        assert_eq!(err.status(), Some(500));
    }

    #[test]
    fn retryable_kinds() {
        assert!(ErrorKind::Network.is_retryable());
        assert!(ErrorKind::Timeout.is_retryable());
        assert!(ErrorKind::RateLimit.is_retryable());
        assert!(!ErrorKind::Api.is_retryable());
        assert!(!ErrorKind::Cors.is_retryable());
        assert!(!ErrorKind::Transform.is_retryable());
        assert!(!ErrorKind::InvalidResponse.is_retryable());
    }

    #[test]
    fn auth_failure_detection() {
        let by_status = Error::new(ErrorKind::Api, "x", "HTTP 401").with_status(401);
        assert!(by_status.is_auth_failure());

        let by_message = Error::new(ErrorKind::Api, "x", "Invalid access code");
        assert!(by_message.is_auth_failure());

        let other = Error::new(ErrorKind::Network, "x", "connection refused");
        assert!(!other.is_auth_failure());
    }
}
