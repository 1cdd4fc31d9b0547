//! Authenticated HTTP client for the CircleCenter API.
//!
//! The centerpiece is [`ApiClient`]: it attaches bearer tokens read from a
//! [`circle_common::CredentialStore`], refreshes the token proactively when
//! it nears expiry, and recovers from a `401` by refreshing once and
//! retrying the request once. Refreshes are single-flight: no matter how
//! many requests discover a stale token at the same time, exactly one call
//! reaches the refresh endpoint and everyone else queues FIFO for its
//! outcome.
//!
//! Typed wrappers for the account and manager endpoints live under
//! [`api::account`], [`api::projects`], and [`api::icons`].
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use circle_client::{ApiClient, ClientConfig};
//! use circle_common::KeychainStore;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::from_env()?;
//!     let store = Arc::new(KeychainStore::new(
//!         "CircleCenter",
//!         "main",
//!         config.refresh_threshold,
//!     ));
//!
//!     let client = ApiClient::builder().config(config).store(store).build()?;
//!     client.on_session_expired(|| {
//!         // Host application: navigate to the login surface.
//!     });
//!
//!     let projects = client.projects().list(50, 0).await?;
//!     println!("{} project(s)", projects.data.map_or(0, |p| p.len()));
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod api;
pub mod config;
pub mod http;

pub use api::client::{ApiClient, ApiClientBuilder};
pub use api::errors::{ApiError, ApiErrorCategory};
pub use api::request::{ApiResponse, FormPayload, RequestBody, RequestDescriptor};
pub use config::ClientConfig;
