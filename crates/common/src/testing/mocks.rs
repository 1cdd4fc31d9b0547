//! Mock implementations of common traits
//!
//! Provides mock objects for testing purposes.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::auth::session::{Session, DEFAULT_REFRESH_THRESHOLD};
use crate::auth::store::CredentialStore;

/// In-memory credential store for deterministic tests.
///
/// Clones share the same underlying session so a store handed to a client
/// can still be inspected by the test afterwards.
#[derive(Debug, Clone)]
pub struct MemoryCredentialStore {
    session: Arc<Mutex<Option<Session>>>,
    refresh_threshold: Duration,
}

impl MemoryCredentialStore {
    /// Create an empty store with the default 3-day refresh threshold.
    #[must_use]
    pub fn new() -> Self {
        Self::with_threshold(DEFAULT_REFRESH_THRESHOLD)
    }

    /// Create an empty store with a custom refresh threshold.
    #[must_use]
    pub fn with_threshold(refresh_threshold: Duration) -> Self {
        Self { session: Arc::new(Mutex::new(None)), refresh_threshold }
    }

    /// Create a store pre-seeded with a session.
    #[must_use]
    pub fn with_session(session: Session, refresh_threshold: Duration) -> Self {
        Self { session: Arc::new(Mutex::new(Some(session))), refresh_threshold }
    }

    /// Synchronous snapshot of the stored session, for test assertions.
    ///
    /// # Panics
    /// Panics if the mutex is poisoned; acceptable in test mocks, the test
    /// has already failed by then.
    #[must_use]
    pub fn snapshot(&self) -> Option<Session> {
        self.session.lock().unwrap().clone()
    }
}

impl Default for MemoryCredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn session(&self) -> Option<Session> {
        self.session.lock().unwrap().clone()
    }

    async fn set_session(&self, session: Session) -> bool {
        *self.session.lock().unwrap() = Some(session);
        true
    }

    async fn clear_session(&self) -> bool {
        *self.session.lock().unwrap() = None;
        true
    }

    fn refresh_threshold(&self) -> Duration {
        self.refresh_threshold
    }
}
