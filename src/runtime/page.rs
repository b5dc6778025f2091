use std::sync::Arc;

use chat_backend::{Attachment, ChatBackend};

use crate::config::ClientConfig;
use crate::core::session::{ChatInstruction, ChatSurface, SessionHandle};
use crate::runtime::attachments::{AttachmentRetriever, RetrieveOutcome};
use crate::runtime::dispatcher::{Dispatcher, SubmitOutcome};
use crate::runtime::health::{HealthProber, HealthStatus};

/// Chat surface controllers wired to one shared session.
pub struct ChatPage {
    session: SessionHandle,
    dispatcher: Dispatcher,
    retriever: AttachmentRetriever,
    prober: HealthProber,
}

impl ChatPage {
    pub fn new(backend: Arc<dyn ChatBackend>, config: &ClientConfig) -> Self {
        let session = SessionHandle::new();
        Self {
            dispatcher: Dispatcher::new(session.clone(), Arc::clone(&backend), config),
            retriever: AttachmentRetriever::new(session.clone(), Arc::clone(&backend)),
            prober: HealthProber::new(session.clone(), backend, config),
            session,
        }
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    /// Focuses the input and runs the one-shot health probe.
    pub async fn on_load(&self) -> HealthStatus {
        self.session
            .with_context(|context| context.emit(ChatInstruction::FocusInput));
        self.prober.probe().await
    }

    pub async fn submit(&self, text: &str) -> SubmitOutcome {
        self.dispatcher.submit(text).await
    }

    pub async fn download(
        &self,
        message_id: &str,
        attachment_id: &str,
        filename: &str,
    ) -> RetrieveOutcome {
        self.retriever.retrieve(message_id, attachment_id, filename).await
    }

    pub async fn download_attachment(&self, attachment: &Attachment) -> RetrieveOutcome {
        self.retriever.retrieve_attachment(attachment).await
    }

    pub fn flush_to(&self, surface: &mut dyn ChatSurface) -> usize {
        self.session.flush_to(surface)
    }
}
