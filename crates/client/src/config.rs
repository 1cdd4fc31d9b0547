//! Client configuration.
//!
//! Read once at startup from environment variables (a local `.env` file is
//! honored). Everything has a working default for a local backend.
//!
//! ## Environment Variables
//! - `CIRCLE_API_BASE_URL`: Backend origin (default `http://localhost:8080`)
//! - `CIRCLE_API_PREFIX`: API path prefix (default `/v1`)
//! - `CIRCLE_HTTP_TIMEOUT_SECS`: Per-request timeout (default 10)
//! - `CIRCLE_TOKEN_REFRESH_THRESHOLD_MS`: Proactive refresh threshold in
//!   milliseconds (default 3 days)

use std::time::Duration;

use circle_common::DEFAULT_REFRESH_THRESHOLD;
use url::Url;

use crate::api::errors::ApiError;

/// Fallback backend origin for local development.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Fallback API path prefix.
pub const DEFAULT_API_PREFIX: &str = "/v1";

/// Fallback per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for [`crate::ApiClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend origin, scheme and authority only (e.g. "https://api.example.com").
    pub base_url: String,
    /// Path prefix every endpoint is mounted under (e.g. "/v1").
    pub api_prefix: String,
    /// Fixed timeout applied to every outbound request.
    pub timeout: Duration,
    /// How close to expiry the access token is refreshed proactively.
    pub refresh_threshold: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            timeout: DEFAULT_TIMEOUT,
            refresh_threshold: DEFAULT_REFRESH_THRESHOLD,
        }
    }
}

impl ClientConfig {
    /// Load configuration from the environment, falling back to defaults
    /// for anything unset.
    ///
    /// # Errors
    /// Returns `ApiError::Config` if a variable is set but unparseable.
    pub fn from_env() -> Result<Self, ApiError> {
        // A missing .env file is fine; explicit env vars still apply.
        let _ = dotenvy::dotenv();

        let base_url = std::env::var("CIRCLE_API_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Url::parse(&base_url)
            .map_err(|e| ApiError::Config(format!("invalid CIRCLE_API_BASE_URL: {e}")))?;

        let api_prefix = std::env::var("CIRCLE_API_PREFIX")
            .unwrap_or_else(|_| DEFAULT_API_PREFIX.to_string());

        let timeout = match std::env::var("CIRCLE_HTTP_TIMEOUT_SECS") {
            Ok(raw) => Duration::from_secs(raw.parse::<u64>().map_err(|e| {
                ApiError::Config(format!("invalid CIRCLE_HTTP_TIMEOUT_SECS: {e}"))
            })?),
            Err(_) => DEFAULT_TIMEOUT,
        };

        let refresh_threshold = match std::env::var("CIRCLE_TOKEN_REFRESH_THRESHOLD_MS") {
            Ok(raw) => Duration::from_millis(raw.parse::<u64>().map_err(|e| {
                ApiError::Config(format!("invalid CIRCLE_TOKEN_REFRESH_THRESHOLD_MS: {e}"))
            })?),
            Err(_) => DEFAULT_REFRESH_THRESHOLD,
        };

        Ok(Self { base_url, api_prefix, timeout, refresh_threshold })
    }

    /// Absolute URL for an API path (`path` starts with `/`).
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url.trim_end_matches('/'), self.api_prefix, path)
    }
}
