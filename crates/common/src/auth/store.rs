//! Credential store contract.
//!
//! The store is the single owner of the [`Session`]; everything else reads
//! and writes through this trait. Mutations report success as a flag rather
//! than an error so callers can decide whether a failed write is fatal.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::session::Session;

/// Storage contract for the current authentication session.
///
/// Implementations must serialize access internally; callers may hit the
/// store from concurrent tasks.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Read the full stored session, if any.
    async fn session(&self) -> Option<Session>;

    /// Replace the stored session.
    ///
    /// # Returns
    /// `true` if the session was persisted.
    async fn set_session(&self, session: Session) -> bool;

    /// Remove the stored session entirely.
    ///
    /// # Returns
    /// `true` if the store is now empty.
    async fn clear_session(&self) -> bool;

    /// The proactive refresh threshold this store was configured with.
    fn refresh_threshold(&self) -> Duration;

    /// The stored access token, if any.
    async fn token(&self) -> Option<String> {
        self.session().await.map(|session| session.access_token)
    }

    /// The stored expiry timestamp, if any.
    async fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.session().await.and_then(|session| session.expires_at)
    }

    /// Whether a usable (present, unexpired) token is stored.
    async fn is_authenticated(&self) -> bool {
        self.session().await.is_some_and(|session| session.is_authenticated())
    }

    /// Whether the stored token is close enough to expiry to refresh now.
    async fn should_refresh(&self) -> bool {
        let threshold = self.refresh_threshold();
        self.session().await.is_some_and(|session| session.should_refresh(threshold))
    }
}
