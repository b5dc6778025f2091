//! Deterministic scripted implementation of the shared `chat_backend` contract.
//!
//! Each endpoint replays a FIFO script of replies and records every call in
//! arrival order. This crate contains no transport logic and is intended for
//! controller-level tests and local development.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chat_backend::{
    Attachment, AttachmentPayload, AuthBackend, BackendError, ChatBackend, ChatOutcome,
    ChatReply, HealthReport, LoginGrant, SessionStatus,
};
use tokio::sync::Notify;

/// One recorded backend call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    SendMessage { message: String },
    DownloadAttachment { attachment: Attachment },
    Health,
    SessionStatus,
    RequestLogin,
}

#[derive(Debug, Default)]
struct Script {
    chat: VecDeque<Result<ChatOutcome, BackendError>>,
    downloads: VecDeque<Result<AttachmentPayload, BackendError>>,
    health: VecDeque<Result<HealthReport, BackendError>>,
    session: VecDeque<Result<SessionStatus, BackendError>>,
    login: VecDeque<Result<LoginGrant, BackendError>>,
    calls: Vec<BackendCall>,
}

/// Scripted backend used by `mailchat` tests.
///
/// Unscripted calls fail with [`BackendError::Unreachable`] so a missing script
/// entry shows up as an explicit failure instead of a silent default.
#[derive(Debug, Default)]
pub struct ScriptedBackend {
    script: Mutex<Script>,
    chat_gate: Mutex<Option<Arc<Notify>>>,
}

impl ScriptedBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a successful assistant reply.
    pub fn push_reply(&self, reply: ChatReply) -> &Self {
        self.push_chat(Ok(ChatOutcome::Reply(reply)))
    }

    /// Queues any chat result, including application-level rejections.
    pub fn push_chat(&self, result: Result<ChatOutcome, BackendError>) -> &Self {
        lock_unpoisoned(&self.script).chat.push_back(result);
        self
    }

    pub fn push_download(&self, result: Result<AttachmentPayload, BackendError>) -> &Self {
        lock_unpoisoned(&self.script).downloads.push_back(result);
        self
    }

    pub fn push_health(&self, result: Result<HealthReport, BackendError>) -> &Self {
        lock_unpoisoned(&self.script).health.push_back(result);
        self
    }

    pub fn push_session(&self, result: Result<SessionStatus, BackendError>) -> &Self {
        lock_unpoisoned(&self.script).session.push_back(result);
        self
    }

    pub fn push_login(&self, result: Result<LoginGrant, BackendError>) -> &Self {
        lock_unpoisoned(&self.script).login.push_back(result);
        self
    }

    /// Holds the next `send_message` call open until the returned signal is
    /// notified, so callers can observe the in-flight state.
    pub fn hold_next_chat(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *lock_unpoisoned(&self.chat_gate) = Some(Arc::clone(&gate));
        gate
    }

    /// Returns all recorded calls in arrival order.
    #[must_use]
    pub fn calls(&self) -> Vec<BackendCall> {
        lock_unpoisoned(&self.script).calls.clone()
    }

    /// Returns the messages passed to `send_message`, in order.
    #[must_use]
    pub fn sent_messages(&self) -> Vec<String> {
        lock_unpoisoned(&self.script)
            .calls
            .iter()
            .filter_map(|call| match call {
                BackendCall::SendMessage { message } => Some(message.clone()),
                _ => None,
            })
            .collect()
    }

    /// Counts recorded calls matching `predicate`.
    #[must_use]
    pub fn count_calls(&self, predicate: impl Fn(&BackendCall) -> bool) -> usize {
        lock_unpoisoned(&self.script)
            .calls
            .iter()
            .filter(|call| predicate(call))
            .count()
    }

    fn record(&self, call: BackendCall) {
        lock_unpoisoned(&self.script).calls.push(call);
    }
}

#[async_trait]
impl ChatBackend for ScriptedBackend {
    async fn send_message(&self, message: &str) -> Result<ChatOutcome, BackendError> {
        self.record(BackendCall::SendMessage {
            message: message.to_string(),
        });

        let gate = lock_unpoisoned(&self.chat_gate).take();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let next = lock_unpoisoned(&self.script).chat.pop_front();
        next.unwrap_or_else(|| Err(unscripted("send_message")))
    }

    async fn download_attachment(
        &self,
        attachment: &Attachment,
    ) -> Result<AttachmentPayload, BackendError> {
        self.record(BackendCall::DownloadAttachment {
            attachment: attachment.clone(),
        });
        let next = lock_unpoisoned(&self.script).downloads.pop_front();
        next.unwrap_or_else(|| Err(unscripted("download_attachment")))
    }

    async fn health(&self) -> Result<HealthReport, BackendError> {
        self.record(BackendCall::Health);
        let next = lock_unpoisoned(&self.script).health.pop_front();
        next.unwrap_or_else(|| Err(unscripted("health")))
    }
}

#[async_trait]
impl AuthBackend for ScriptedBackend {
    async fn session_status(&self) -> Result<SessionStatus, BackendError> {
        self.record(BackendCall::SessionStatus);
        let next = lock_unpoisoned(&self.script).session.pop_front();
        next.unwrap_or_else(|| Err(unscripted("session_status")))
    }

    async fn request_login(&self) -> Result<LoginGrant, BackendError> {
        self.record(BackendCall::RequestLogin);
        let next = lock_unpoisoned(&self.script).login.pop_front();
        next.unwrap_or_else(|| Err(unscripted("request_login")))
    }
}

fn unscripted(endpoint: &str) -> BackendError {
    BackendError::Unreachable(format!("no scripted response for {endpoint}"))
}

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
