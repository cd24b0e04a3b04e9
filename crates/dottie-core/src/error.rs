// ── Core error types ──
//
// Pipeline failures pass through untouched so callers keep the full
// classification (kind, status, retry hint). The core layer only adds
// failures of its own: catalog lookups and parameter conversion.

use dottie_api::{ErrorKind, ValidationError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Unknown endpoint: {id}")]
    UnknownEndpoint { id: String },

    #[error("Invalid parameters: {0}")]
    InvalidParams(#[from] ValidationError),

    #[error(transparent)]
    Api(#[from] dottie_api::Error),
}

impl CoreError {
    /// The pipeline classification, if this failure came from a call.
    pub fn api_kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Api(e) => Some(e.kind()),
            Self::UnknownEndpoint { .. } | Self::InvalidParams(_) => None,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.api_kind().is_some_and(ErrorKind::is_retryable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_errors_keep_their_classification() {
        let err: CoreError = dottie_api::Error::new(ErrorKind::Timeout, "e", "slow").into();
        assert_eq!(err.api_kind(), Some(ErrorKind::Timeout));
        assert!(err.is_retryable());

        let lookup = CoreError::UnknownEndpoint { id: "nope".into() };
        assert_eq!(lookup.api_kind(), None);
        assert!(!lookup.is_retryable());
    }
}
