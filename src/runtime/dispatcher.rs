//! Single-flight message dispatch.

use std::sync::Arc;

use chat_backend::{ChatBackend, ChatOutcome};
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::core::session::{ChatInstruction, IndicatorId, SessionContext, SessionHandle};
use crate::core::transcript::Turn;
use crate::error::ClientError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitRejection {
    /// Empty or whitespace-only input.
    Empty,
    /// Another exchange is still in flight.
    Busy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Rejected before any side effect.
    Ignored(SubmitRejection),
    /// Assistant reply appended at `turn_index`.
    Replied { turn_index: usize },
    /// Error turn appended. [`ClientError::Application`] for a backend
    /// rejection, [`ClientError::Transport`] otherwise.
    Failed(ClientError),
}

pub struct Dispatcher {
    session: SessionHandle,
    backend: Arc<dyn ChatBackend>,
    api_base_url: String,
}

impl Dispatcher {
    pub fn new(session: SessionHandle, backend: Arc<dyn ChatBackend>, config: &ClientConfig) -> Self {
        Self {
            session,
            backend,
            api_base_url: config.api_base_url.clone(),
        }
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    /// Runs one message exchange to settlement.
    ///
    /// The busy gate and input surface are restored on every exit path,
    /// including when the returned future is dropped mid-flight.
    pub async fn submit(&self, text: &str) -> SubmitOutcome {
        let message = text.trim();
        if message.is_empty() {
            debug!("ignoring empty submission");
            return SubmitOutcome::Ignored(SubmitRejection::Empty);
        }

        let Some(indicator) = self.session.with_context(|context| begin(context, message)) else {
            debug!("ignoring submission while busy");
            return SubmitOutcome::Ignored(SubmitRejection::Busy);
        };
        let release = BusyRelease {
            session: self.session.clone(),
            indicator,
        };

        info!(chars = message.len(), "dispatching chat message");
        let settled = self.backend.send_message(message).await;

        let (turn, failure) = match settled {
            Ok(ChatOutcome::Reply(reply)) => (Turn::assistant(reply.text, reply.attachments), None),
            Ok(ChatOutcome::Rejected { message }) => {
                let error = ClientError::Application(message);
                (Turn::error(error.user_message()), Some(error))
            }
            Err(source) => {
                let error = ClientError::Transport {
                    source,
                    api_base_url: self.api_base_url.clone(),
                };
                (Turn::error(error.user_message()), Some(error))
            }
        };

        let turn_index = self.session.with_context(|context| {
            context.remove_pending(indicator);
            context.append_turn(turn)
        });
        drop(release);

        match failure {
            None => {
                info!(turn_index, "chat exchange settled");
                SubmitOutcome::Replied { turn_index }
            }
            Some(error) => {
                warn!(error = %error, "chat exchange failed");
                SubmitOutcome::Failed(error)
            }
        }
    }
}

fn begin(context: &mut SessionContext, message: &str) -> Option<IndicatorId> {
    if !context.try_acquire_busy() {
        return None;
    }
    context.emit(ChatInstruction::SetInputEnabled(false));
    context.append_turn(Turn::user(message));
    context.emit(ChatInstruction::ClearInput);
    Some(context.show_pending())
}

/// Releases the busy gate when dropped.
struct BusyRelease {
    session: SessionHandle,
    indicator: IndicatorId,
}

impl Drop for BusyRelease {
    fn drop(&mut self) {
        let indicator = self.indicator;
        self.session.with_context(|context| {
            context.remove_pending(indicator);
            context.release_busy();
            context.emit(ChatInstruction::SetInputEnabled(true));
            context.emit(ChatInstruction::FocusInput);
        });
    }
}
