//! Keychain-backed credential store.
//!
//! Persists the session in the platform keychain (macOS Keychain, Windows
//! Credential Manager, Linux Secret Service) so the token is encrypted at
//! rest. Two entries are kept per account: the raw access token, and a JSON
//! metadata record holding the expiry and the cached user info.
//!
//! The inherent methods return [`StoreError`] for diagnostics; the
//! [`CredentialStore`] impl downgrades failures to `None`/`false` with a
//! warning, matching the contract's success-flag surface.

use std::time::Duration;

use async_trait::async_trait;
use keyring::Entry;
use serde_json::json;
use tracing::{debug, warn};

use super::session::Session;
use super::store::CredentialStore;

const TOKEN_PREFIX: &str = "token.";
const SESSION_PREFIX: &str = "session.";

/// Error type for keychain store operations
#[derive(Debug)]
pub enum StoreError {
    /// Keychain operation failed
    Keyring(String),

    /// No session stored for the account
    NotFound,

    /// Metadata record could not be encoded or decoded
    Serde(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Keyring(e) => write!(f, "Keychain error: {e}"),
            Self::NotFound => write!(f, "No stored session"),
            Self::Serde(e) => write!(f, "Session metadata error: {e}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<keyring::Error> for StoreError {
    fn from(err: keyring::Error) -> Self {
        match err {
            keyring::Error::NoEntry => Self::NotFound,
            other => Self::Keyring(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde(err.to_string())
    }
}

/// Durable session storage on the platform keychain.
pub struct KeychainStore {
    service: String,
    account: String,
    refresh_threshold: Duration,
}

impl KeychainStore {
    /// Create a new keychain store.
    ///
    /// # Arguments
    /// * `service` - Keychain service name (e.g., "CircleCenter")
    /// * `account` - Account identifier (e.g., "main" or a user email)
    /// * `refresh_threshold` - Refresh tokens this close to expiry
    #[must_use]
    pub fn new(
        service: impl Into<String>,
        account: impl Into<String>,
        refresh_threshold: Duration,
    ) -> Self {
        Self { service: service.into(), account: account.into(), refresh_threshold }
    }

    fn entry(&self, prefix: &str) -> Result<Entry, StoreError> {
        Entry::new(&self.service, &format!("{prefix}{}", self.account)).map_err(StoreError::from)
    }

    /// Load the stored session.
    ///
    /// # Errors
    /// Returns [`StoreError::NotFound`] if no token is stored, or a keychain
    /// error if the platform store is unavailable.
    pub fn load(&self) -> Result<Session, StoreError> {
        let access_token = self.entry(TOKEN_PREFIX)?.get_password()?;

        // The metadata record is best-effort: a token without one still
        // yields a session (with no expiry, so it reads as expired).
        let metadata: serde_json::Value = match self.entry(SESSION_PREFIX)?.get_password() {
            Ok(raw) => serde_json::from_str(&raw)?,
            Err(keyring::Error::NoEntry) => json!({}),
            Err(other) => return Err(other.into()),
        };

        let expires_at = metadata.get("expires_at").and_then(|v| v.as_i64());
        let user_info = metadata.get("user_info").filter(|v| !v.is_null()).cloned();

        Ok(Session::new(access_token, expires_at, user_info))
    }

    /// Persist a session.
    ///
    /// # Errors
    /// Returns an error if either keychain write fails.
    pub fn store(&self, session: &Session) -> Result<(), StoreError> {
        debug!(account = %self.account, "storing session in keychain");

        self.entry(TOKEN_PREFIX)?.set_password(&session.access_token)?;

        let metadata = json!({
            "expires_at": session.expires_at_unix(),
            "user_info": session.user_info,
        });
        self.entry(SESSION_PREFIX)?.set_password(&serde_json::to_string(&metadata)?)?;

        Ok(())
    }

    /// Delete the stored session. Missing entries are not an error; logout
    /// must succeed on an already-empty keychain.
    ///
    /// # Errors
    /// Returns an error if the keychain refuses the deletion.
    pub fn clear(&self) -> Result<(), StoreError> {
        debug!(account = %self.account, "clearing session from keychain");

        for prefix in [TOKEN_PREFIX, SESSION_PREFIX] {
            match self.entry(prefix)?.delete_credential() {
                Ok(()) | Err(keyring::Error::NoEntry) => {}
                Err(other) => return Err(other.into()),
            }
        }
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for KeychainStore {
    async fn session(&self) -> Option<Session> {
        match self.load() {
            Ok(session) => Some(session),
            Err(StoreError::NotFound) => None,
            Err(err) => {
                warn!(error = %err, "failed to read session from keychain");
                None
            }
        }
    }

    async fn set_session(&self, session: Session) -> bool {
        match self.store(&session) {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, "failed to persist session to keychain");
                false
            }
        }
    }

    async fn clear_session(&self) -> bool {
        match self.clear() {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, "failed to clear session from keychain");
                false
            }
        }
    }

    fn refresh_threshold(&self) -> Duration {
        self.refresh_threshold
    }
}
