//! Minimal backend contract for the mailchat client controllers.
//!
//! This crate defines only the request/reply shapes exchanged with the chat
//! backend and the login endpoints, plus the single failure type allowed to
//! cross the boundary. HTTP transport lives in `chat_api`; deterministic test
//! doubles live in `chat_backend_mock`.

use async_trait::async_trait;
use thiserror::Error;

/// Reference to a remotely stored attachment. Carries no payload until retrieved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub message_id: String,
    pub attachment_id: String,
    pub filename: String,
    pub mime_type: Option<String>,
    pub size: Option<u64>,
}

impl Attachment {
    #[must_use]
    pub fn new(
        message_id: impl Into<String>,
        attachment_id: impl Into<String>,
        filename: impl Into<String>,
    ) -> Self {
        Self {
            message_id: message_id.into(),
            attachment_id: attachment_id.into(),
            filename: filename.into(),
            mime_type: None,
            size: None,
        }
    }

    #[must_use]
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    #[must_use]
    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }
}

/// Successful assistant reply for one chat exchange.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChatReply {
    pub text: String,
    pub attachments: Vec<Attachment>,
}

impl ChatReply {
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            attachments: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_attachments(mut self, attachments: Vec<Attachment>) -> Self {
        self.attachments = attachments;
        self
    }
}

/// Transport-successful chat result: either a reply or a well-formed
/// application-level error payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatOutcome {
    Reply(ChatReply),
    Rejected { message: String },
}

/// Binary body returned by an attachment retrieval.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AttachmentPayload {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

/// Optional metadata reported by the health endpoint. Informational only.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HealthReport {
    pub status: Option<String>,
    pub service: Option<String>,
}

/// Session status reported by the auth endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionStatus {
    pub authenticated: bool,
}

/// Login initiation reply. `auth_url` is absent when the backend answered
/// successfully but did not hand out an authorization URL.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LoginGrant {
    pub auth_url: Option<String>,
}

/// Failure crossing the backend boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// The endpoint could not be reached at all.
    #[error("{0}")]
    Unreachable(String),

    /// Non-success status without a usable error body.
    #[error("HTTP error! status: {0}")]
    Status(u16),

    /// Non-success status whose body carried an `error` message.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    /// Success status with a body that could not be decoded.
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl BackendError {
    /// Returns the HTTP status when the failure came from a response.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status(status) | Self::Rejected { status, .. } => Some(*status),
            Self::Unreachable(_) | Self::Malformed(_) => None,
        }
    }

    /// Returns the backend-supplied error message, if the body carried one.
    #[must_use]
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            Self::Rejected { message, .. } => Some(message),
            _ => None,
        }
    }
}

/// Chat-surface endpoints: message exchange, attachment retrieval, health.
#[async_trait]
pub trait ChatBackend: Send + Sync + 'static {
    /// Sends one user message and returns the settled exchange.
    async fn send_message(&self, message: &str) -> Result<ChatOutcome, BackendError>;

    /// Fetches the binary payload for one attachment.
    async fn download_attachment(
        &self,
        attachment: &Attachment,
    ) -> Result<AttachmentPayload, BackendError>;

    /// One health probe. Any success status means healthy.
    async fn health(&self) -> Result<HealthReport, BackendError>;
}

/// Login-surface endpoints. Implementations must attach session credentials.
#[async_trait]
pub trait AuthBackend: Send + Sync + 'static {
    async fn session_status(&self) -> Result<SessionStatus, BackendError>;

    async fn request_login(&self) -> Result<LoginGrant, BackendError>;
}
