//! HTTP transport for the mailchat backend.
//!
//! This crate owns request building and response decoding for the chat,
//! attachment, health and auth endpoints. It contains no UI state; the
//! `mailchat` controllers consume it through the `chat_backend` traits, which
//! [`ChatApiClient`] implements.
//!
//! No retry or backoff is applied: every failure is reported to the caller
//! exactly once.

pub mod client;
pub mod config;
pub mod error;
pub mod payload;
pub mod url;

pub use client::ChatApiClient;
pub use config::ChatApiConfig;
pub use error::ChatApiError;
pub use payload::{AttachmentRequest, ChatRequest, ChatResponseBody};
pub use url::{endpoint_url, normalize_base_url};
