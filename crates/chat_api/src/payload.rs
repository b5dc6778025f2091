use chat_backend::{Attachment, ChatOutcome, ChatReply, HealthReport, LoginGrant, SessionStatus};
use serde::{Deserialize, Serialize};

/// Body of `POST /api/chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatRequest {
    pub message: String,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Body of `POST /api/download-attachment`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttachmentRequest {
    pub message_id: String,
    pub attachment_id: String,
    pub filename: String,
}

impl From<&Attachment> for AttachmentRequest {
    fn from(attachment: &Attachment) -> Self {
        Self {
            message_id: attachment.message_id.clone(),
            attachment_id: attachment.attachment_id.clone(),
            filename: attachment.filename.clone(),
        }
    }
}

/// Chat reply body. `error` wins over `response` when both are present.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatResponseBody {
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub attachments: Option<Vec<AttachmentBody>>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AttachmentBody {
    pub message_id: String,
    pub attachment_id: String,
    pub filename: String,
    #[serde(rename = "mimeType", default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
}

impl From<AttachmentBody> for Attachment {
    fn from(body: AttachmentBody) -> Self {
        Self {
            message_id: body.message_id,
            attachment_id: body.attachment_id,
            filename: body.filename,
            mime_type: body.mime_type,
            size: body.size,
        }
    }
}

impl ChatResponseBody {
    pub fn into_outcome(self) -> ChatOutcome {
        if let Some(message) = self.error.filter(|message| !message.is_empty()) {
            return ChatOutcome::Rejected { message };
        }

        ChatOutcome::Reply(ChatReply {
            text: self.response.unwrap_or_default(),
            attachments: self
                .attachments
                .unwrap_or_default()
                .into_iter()
                .map(Attachment::from)
                .collect(),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HealthBody {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub service: Option<String>,
}

impl From<HealthBody> for HealthReport {
    fn from(body: HealthBody) -> Self {
        Self {
            status: body.status,
            service: body.service,
        }
    }
}

/// `GET /auth/user` body. A missing flag reads as unauthenticated.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionBody {
    #[serde(default)]
    pub authenticated: bool,
}

impl From<SessionBody> for SessionStatus {
    fn from(body: SessionBody) -> Self {
        Self {
            authenticated: body.authenticated,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginBody {
    #[serde(default)]
    pub auth_url: Option<String>,
}

impl From<LoginBody> for LoginGrant {
    fn from(body: LoginBody) -> Self {
        Self {
            auth_url: body.auth_url.filter(|url| !url.trim().is_empty()),
        }
    }
}
