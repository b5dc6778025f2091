use std::sync::Arc;

use chat_backend::{ChatBackend, HealthReport};
use tracing::{info, warn};

use crate::config::ClientConfig;
use crate::core::session::{SessionContext, SessionHandle};
use crate::core::transcript::Turn;
use crate::error::ClientError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    Healthy(HealthReport),
    /// A warning turn was appended.
    Unreachable(ClientError),
    /// The session was already probed; nothing was sent.
    AlreadyProbed,
}

/// One-shot backend connectivity check.
pub struct HealthProber {
    session: SessionHandle,
    backend: Arc<dyn ChatBackend>,
    start_command: String,
}

impl HealthProber {
    pub fn new(session: SessionHandle, backend: Arc<dyn ChatBackend>, config: &ClientConfig) -> Self {
        Self {
            session,
            backend,
            start_command: config.backend_start_command.clone(),
        }
    }

    pub async fn probe(&self) -> HealthStatus {
        if !self.session.with_context(SessionContext::claim_health_probe) {
            return HealthStatus::AlreadyProbed;
        }

        match self.backend.health().await {
            Ok(report) => {
                info!(
                    status = report.status.as_deref().unwrap_or("unknown"),
                    service = report.service.as_deref().unwrap_or("unknown"),
                    "backend is healthy"
                );
                HealthStatus::Healthy(report)
            }
            Err(source) => {
                warn!(error = %source, "backend is not running");
                let error = ClientError::HealthProbe {
                    source,
                    start_command: self.start_command.clone(),
                };
                self.session.append_turn(Turn::error(error.user_message()));
                HealthStatus::Unreachable(error)
            }
        }
    }
}
