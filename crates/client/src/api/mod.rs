//! Authenticated API client and typed endpoint surface.
//!
//! # Module Organization
//!
//! - **[`client`]**: the [`ApiClient`](client::ApiClient) request pipeline
//!   (allow-list bypass, bearer attachment, proactive refresh, single
//!   401→refresh→retry)
//! - **[`refresh`]**: single-flight refresh coordination with a FIFO waiter
//!   queue
//! - **[`request`]**: rebuildable request descriptors, multipart form
//!   payloads, raw responses
//! - **[`errors`]**: the error taxonomy
//! - **[`types`]**: wire types (`ApiEnvelope`, endpoint payloads)
//! - **[`account`]**, **[`projects`]**, **[`icons`]**: typed endpoints

pub mod account;
pub mod client;
pub mod errors;
pub mod icons;
pub mod projects;
pub mod refresh;
pub mod request;
pub mod types;

pub use client::{ApiClient, ApiClientBuilder};
pub use errors::{ApiError, ApiErrorCategory};
pub use request::{ApiResponse, FormPayload, RequestBody, RequestDescriptor};
pub use types::ApiEnvelope;
