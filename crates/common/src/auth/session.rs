//! Session type and expiry invariants.
//!
//! A [`Session`] is the client's belief about the current authentication
//! state. It is created empty at process start (no session in the store),
//! populated by a successful login or token refresh, and cleared entirely on
//! logout or refresh failure.

use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// How long before expiry a token is refreshed proactively (3 days).
pub const DEFAULT_REFRESH_THRESHOLD: Duration = Duration::from_secs(3 * 24 * 60 * 60);

/// Authentication state as stored in a credential store.
///
/// The expiry is the backend's `expires_at` unix-seconds timestamp; user
/// info is whatever profile payload the login response carried, kept opaque.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Bearer access token for API authentication.
    pub access_token: String,

    /// Absolute expiration timestamp (UTC).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,

    /// Cached user profile returned by the login endpoint, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_info: Option<serde_json::Value>,
}

impl Session {
    /// Create a session from the wire representation.
    ///
    /// # Arguments
    /// * `access_token` - The bearer token
    /// * `expires_at_unix` - Expiry as unix seconds, as the backend sends it
    /// * `user_info` - Optional cached profile payload
    #[must_use]
    pub fn new(
        access_token: String,
        expires_at_unix: Option<i64>,
        user_info: Option<serde_json::Value>,
    ) -> Self {
        let expires_at = expires_at_unix.and_then(|ts| Utc.timestamp_opt(ts, 0).single());
        Self { access_token, expires_at, user_info }
    }

    /// Whether this session is currently usable.
    ///
    /// True iff the token is present and `now < expires_at`. A session
    /// without a stored expiry counts as expired.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        if self.access_token.is_empty() {
            return false;
        }
        match self.expires_at {
            Some(expires_at) => Utc::now() < expires_at,
            None => false,
        }
    }

    /// Whether the token should be refreshed proactively.
    ///
    /// True iff the token is present and `now + threshold >= expires_at`
    /// (boundary inclusive). A session without a stored expiry always wants
    /// a refresh.
    #[must_use]
    pub fn should_refresh(&self, threshold: Duration) -> bool {
        if self.access_token.is_empty() {
            return false;
        }
        match self.expires_at {
            Some(expires_at) => {
                let threshold = chrono::Duration::milliseconds(threshold.as_millis() as i64);
                Utc::now() + threshold >= expires_at
            }
            None => true,
        }
    }

    /// Seconds until expiry, or `None` if no expiry is stored.
    #[must_use]
    pub fn seconds_until_expiry(&self) -> Option<i64> {
        self.expires_at.map(|expires_at| (expires_at - Utc::now()).num_seconds())
    }

    /// Expiry as unix seconds, the backend's wire representation.
    #[must_use]
    pub fn expires_at_unix(&self) -> Option<i64> {
        self.expires_at.map(|expires_at| expires_at.timestamp())
    }
}
