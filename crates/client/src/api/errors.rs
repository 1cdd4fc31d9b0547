//! API-specific error types
//!
//! Provides error classification for API operations. The only error class
//! the client recovers from on its own is a first `401` per request (one
//! refresh, one retry); everything here is surfaced to the caller.

use std::time::Duration;

use thiserror::Error;

/// Categories of API errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorCategory {
    /// Authentication refused (401 after the retry, or 403)
    Authentication,
    /// The refresh endpoint itself failed; the session was torn down
    Refresh,
    /// Rate limiting (429)
    RateLimit,
    /// Server errors (5xx)
    Server,
    /// Client errors (4xx except auth)
    Client,
    /// Transport or timeout failure
    Network,
    /// Configuration errors
    Config,
}

/// API operation errors
#[derive(Debug, Error)]
pub enum ApiError {
    /// The backend refused the credentials. Carries the raw response body so
    /// out-of-band payloads (e.g. `ACCOUNT_NOT_VERIFIED`) reach the caller
    /// undisturbed.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The refresh endpoint failed; the session has been cleared.
    #[error("token refresh failed: {0}")]
    RefreshFailed(String),

    #[error("rate limit exceeded: {0}")]
    RateLimit(String),

    #[error("server error: {0}")]
    Server(String),

    #[error("client error: {0}")]
    Client(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("timeout after {0:?}")]
    Timeout(Duration),

    #[error("configuration error: {0}")]
    Config(String),
}

impl ApiError {
    /// Get the error category for this error
    #[must_use]
    pub fn category(&self) -> ApiErrorCategory {
        match self {
            Self::Auth(_) => ApiErrorCategory::Authentication,
            Self::RefreshFailed(_) => ApiErrorCategory::Refresh,
            Self::RateLimit(_) => ApiErrorCategory::RateLimit,
            Self::Server(_) => ApiErrorCategory::Server,
            Self::Client(_) => ApiErrorCategory::Client,
            Self::Network(_) | Self::Timeout(_) => ApiErrorCategory::Network,
            Self::Config(_) => ApiErrorCategory::Config,
        }
    }

    /// The raw response body for status-derived errors, if one was captured.
    #[must_use]
    pub fn response_body(&self) -> Option<&str> {
        match self {
            Self::Auth(body)
            | Self::RateLimit(body)
            | Self::Server(body)
            | Self::Client(body) => Some(body),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categories() {
        assert_eq!(
            ApiError::Auth("test".to_string()).category(),
            ApiErrorCategory::Authentication
        );
        assert_eq!(
            ApiError::RefreshFailed("test".to_string()).category(),
            ApiErrorCategory::Refresh
        );
        assert_eq!(
            ApiError::RateLimit("test".to_string()).category(),
            ApiErrorCategory::RateLimit
        );
        assert_eq!(
            ApiError::Network("test".to_string()).category(),
            ApiErrorCategory::Network
        );
        assert_eq!(
            ApiError::Timeout(Duration::from_secs(10)).category(),
            ApiErrorCategory::Network
        );
    }

    #[test]
    fn response_body_only_for_status_errors() {
        assert_eq!(
            ApiError::Auth("{\"code\":\"ACCOUNT_NOT_VERIFIED\"}".to_string()).response_body(),
            Some("{\"code\":\"ACCOUNT_NOT_VERIFIED\"}")
        );
        assert_eq!(ApiError::Network("reset".to_string()).response_body(), None);
        assert_eq!(ApiError::RefreshFailed("500".to_string()).response_body(), None);
    }
}
