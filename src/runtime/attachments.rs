use std::sync::Arc;

use chat_backend::{Attachment, ChatBackend};
use tracing::{info, warn};

use crate::core::session::{ChatInstruction, SessionHandle};
use crate::core::transcript::Turn;
use crate::error::ClientError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetrieveOutcome {
    Saved { filename: String, bytes: usize },
    Failed(ClientError),
}

/// Downloads attachments. Never consults or changes the busy gate, so it can
/// run while a chat exchange is in flight.
pub struct AttachmentRetriever {
    session: SessionHandle,
    backend: Arc<dyn ChatBackend>,
}

impl AttachmentRetriever {
    pub fn new(session: SessionHandle, backend: Arc<dyn ChatBackend>) -> Self {
        Self { session, backend }
    }

    /// Entry point for a download action carrying the identity triple.
    pub async fn retrieve(
        &self,
        message_id: &str,
        attachment_id: &str,
        filename: &str,
    ) -> RetrieveOutcome {
        let attachment = Attachment::new(message_id, attachment_id, filename);
        self.retrieve_attachment(&attachment).await
    }

    pub async fn retrieve_attachment(&self, attachment: &Attachment) -> RetrieveOutcome {
        let filename = attachment.filename.clone();

        match self.backend.download_attachment(attachment).await {
            Ok(payload) => {
                let bytes = payload.bytes.len();
                info!(filename = %filename, bytes, "attachment downloaded");
                let confirmation = Turn::assistant(format!("Downloaded: {filename}"), Vec::new());
                self.session.with_context(|context| {
                    context.emit(ChatInstruction::SaveFile {
                        filename: filename.clone(),
                        content_type: payload.content_type,
                        bytes: payload.bytes,
                    });
                    context.append_turn(confirmation);
                });
                RetrieveOutcome::Saved { filename, bytes }
            }
            Err(source) => {
                warn!(filename = %filename, error = %source, "attachment download failed");
                let error = ClientError::Attachment { filename, source };
                self.session
                    .append_turn(Turn::error(error.user_message()));
                RetrieveOutcome::Failed(error)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chat_backend::{AttachmentPayload, BackendError};
    use chat_backend_mock::{BackendCall, ScriptedBackend};

    use super::*;

    #[tokio::test]
    async fn success_saves_then_confirms() {
        let backend = Arc::new(ScriptedBackend::new());
        backend.push_download(Ok(AttachmentPayload {
            bytes: b"%PDF".to_vec(),
            content_type: Some("application/pdf".to_string()),
        }));
        let session = SessionHandle::new();
        let retriever = AttachmentRetriever::new(session.clone(), backend.clone());

        let outcome = retriever.retrieve("m-1", "a-1", "q3.pdf").await;

        assert_eq!(
            outcome,
            RetrieveOutcome::Saved {
                filename: "q3.pdf".to_string(),
                bytes: 4,
            }
        );
        let instructions = session.drain_instructions();
        assert_eq!(
            instructions[0],
            ChatInstruction::SaveFile {
                filename: "q3.pdf".to_string(),
                content_type: Some("application/pdf".to_string()),
                bytes: b"%PDF".to_vec(),
            }
        );
        assert!(matches!(instructions[1], ChatInstruction::AppendTurn { is_error: false, .. }));
        assert_eq!(session.turns()[0].text, "Downloaded: q3.pdf");
        assert_eq!(
            backend.calls(),
            vec![BackendCall::DownloadAttachment {
                attachment: Attachment::new("m-1", "a-1", "q3.pdf"),
            }]
        );
    }

    #[tokio::test]
    async fn backend_reason_is_surfaced() {
        let backend = Arc::new(ScriptedBackend::new());
        backend.push_download(Err(BackendError::Rejected {
            status: 401,
            message: "Not authenticated".to_string(),
        }));
        let session = SessionHandle::new();
        let retriever = AttachmentRetriever::new(session.clone(), backend);

        retriever.retrieve("m-1", "a-1", "q3.pdf").await;

        let turns = session.turns();
        assert_eq!(turns.len(), 1);
        assert!(turns[0].is_error);
        assert_eq!(turns[0].text, "Failed to download q3.pdf: Not authenticated");
    }
}
