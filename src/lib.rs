//! Client-side controllers for a mail-assistant chat backend.
//!
//! Invariant: controllers never mutate a display directly. Every visible change
//! is queued as an instruction and drained by a surface adapter
//! ([`ChatSurface`] for the chat page, [`LoginSurface`] for the login page).
//!
//! # Public API Overview
//! - Wire the chat page with [`ChatPage`], or use [`Dispatcher`],
//!   [`AttachmentRetriever`] and [`HealthProber`] over a shared [`SessionHandle`].
//! - Gate the login page with [`AuthGate`].
//! - Render chat text safely with [`render`] / [`render_with_attachments`].
//! - Backends plug in through the `chat_backend` traits; `chat_api` provides
//!   the HTTP implementation.

pub mod config;
pub mod error;

pub mod auth;
pub mod core;
pub mod render;
pub mod runtime;

/// Backend contract re-exports.
pub use chat_backend::{
    Attachment, AttachmentPayload, AuthBackend, BackendError, ChatBackend, ChatOutcome,
    ChatReply, HealthReport, LoginGrant, SessionStatus,
};

/// Login-surface state machine.
pub use crate::auth::{
    AuthGate, GateTransitionError, LoginInstruction, LoginLabel, LoginOutcome, LoginSurface,
    OAuthReturnCode, RedirectTarget, SessionState,
};
pub use crate::config::ClientConfig;
pub use crate::error::ClientError;

/// Session data and chat-surface instructions.
pub use crate::core::session::{
    ChatInstruction, ChatSurface, IndicatorId, SessionContext, SessionHandle,
};
pub use crate::core::transcript::{Sender, Transcript, Turn};

/// Markup rendering.
pub use crate::render::{escape_html, render, render_turn, render_with_attachments, Markup};

/// Chat-surface controllers.
pub use crate::runtime::{
    AttachmentRetriever, ChatPage, Dispatcher, HealthProber, HealthStatus, RetrieveOutcome,
    SubmitOutcome, SubmitRejection,
};
