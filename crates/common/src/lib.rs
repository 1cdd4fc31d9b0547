//! Shared primitives for the CircleCenter client SDK.
//!
//! This crate owns the pieces of authentication state that the HTTP client
//! consumes but must never own itself:
//!
//! - [`auth::Session`]: the client's belief about the current login state
//!   (access token, expiry, cached user info)
//! - [`auth::CredentialStore`]: the storage contract the client reads the
//!   session through on every request attempt
//! - [`auth::KeychainStore`]: the durable, platform-keychain-backed store
//! - [`testing::MemoryCredentialStore`]: an in-memory store for tests

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod auth;
pub mod testing;

pub use auth::keychain::{KeychainStore, StoreError};
pub use auth::session::{Session, DEFAULT_REFRESH_THRESHOLD};
pub use auth::store::CredentialStore;
