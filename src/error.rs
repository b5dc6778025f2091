//! Client error taxonomy.
//!
//! Every failure is caught at the operation that produced it and turned into
//! exactly one user-visible message through [`ClientError::user_message`].

use chat_backend::BackendError;
use thiserror::Error;

use crate::auth::OAuthReturnCode;

pub const ATTACHMENT_FALLBACK_REASON: &str = "Failed to download attachment";
pub const LOGIN_FALLBACK_REASON: &str = "Failed to initiate login";
pub const MISSING_AUTH_URL: &str = "No authorization URL received";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// Chat request never produced a structured payload.
    #[error("chat transport failed: {source}")]
    Transport {
        source: BackendError,
        api_base_url: String,
    },

    /// Chat request produced a well-formed `{ error }` payload.
    #[error("backend rejected message: {0}")]
    Application(String),

    #[error("attachment {filename} failed: {source}")]
    Attachment {
        filename: String,
        source: BackendError,
    },

    /// One-shot health probe found the backend unreachable.
    #[error("health probe failed: {source}")]
    HealthProbe {
        source: BackendError,
        start_command: String,
    },

    /// Session status query failed on the login surface.
    #[error("session check failed: {source}")]
    AuthProbe {
        source: BackendError,
        start_command: String,
    },

    #[error("login initiation failed: {0}")]
    LoginInitiation(String),

    #[error("oauth return error: {}", .0.as_str())]
    OAuthReturn(OAuthReturnCode),
}

impl ClientError {
    /// Login initiation failure carrying the backend's `error` field when present.
    pub fn login_failed(source: &BackendError) -> Self {
        let reason = source.backend_message().unwrap_or(LOGIN_FALLBACK_REASON);
        Self::LoginInitiation(reason.to_string())
    }

    pub fn missing_auth_url() -> Self {
        Self::LoginInitiation(MISSING_AUTH_URL.to_string())
    }

    /// The single message shown to the user for this failure.
    pub fn user_message(&self) -> String {
        match self {
            Self::Transport {
                source,
                api_base_url,
            } => format!(
                "Error: {source}. Make sure the backend server is running on {api_base_url}"
            ),
            Self::Application(message) => format!("Error: {message}"),
            Self::Attachment { filename, source } => {
                let reason = source
                    .backend_message()
                    .unwrap_or(ATTACHMENT_FALLBACK_REASON);
                format!("Failed to download {filename}: {reason}")
            }
            Self::HealthProbe { start_command, .. } => format!(
                "Warning: Backend server is not running. Please start the Python backend with: {start_command}"
            ),
            Self::AuthProbe { start_command, .. } => {
                format!("Backend server is not running. Please start it with: {start_command}")
            }
            Self::LoginInitiation(reason) => reason.clone(),
            Self::OAuthReturn(code) => code.message(),
        }
    }
}

#[cfg(test)]
mod tests {
    use chat_backend::BackendError;

    use super::ClientError;
    use crate::auth::OAuthReturnCode;

    #[test]
    fn transport_message_names_reason_and_base_url() {
        let error = ClientError::Transport {
            source: BackendError::Status(500),
            api_base_url: "http://localhost:5001".to_string(),
        };

        assert_eq!(
            error.user_message(),
            "Error: HTTP error! status: 500. Make sure the backend server is running on http://localhost:5001"
        );
    }

    #[test]
    fn application_message_is_prefixed() {
        assert_eq!(
            ClientError::Application("Not authenticated".to_string()).user_message(),
            "Error: Not authenticated"
        );
    }

    #[test]
    fn attachment_message_prefers_backend_reason() {
        let rejected = ClientError::Attachment {
            filename: "q3.pdf".to_string(),
            source: BackendError::Rejected {
                status: 404,
                message: "Attachment not found".to_string(),
            },
        };
        let bare = ClientError::Attachment {
            filename: "q3.pdf".to_string(),
            source: BackendError::Unreachable("connection refused".to_string()),
        };

        assert_eq!(
            rejected.user_message(),
            "Failed to download q3.pdf: Attachment not found"
        );
        assert_eq!(
            bare.user_message(),
            "Failed to download q3.pdf: Failed to download attachment"
        );
    }

    #[test]
    fn probe_messages_name_start_command() {
        let health = ClientError::HealthProbe {
            source: BackendError::Unreachable("refused".to_string()),
            start_command: "make serve".to_string(),
        };
        let auth = ClientError::AuthProbe {
            source: BackendError::Unreachable("refused".to_string()),
            start_command: "make serve".to_string(),
        };

        assert_eq!(
            health.user_message(),
            "Warning: Backend server is not running. Please start the Python backend with: make serve"
        );
        assert_eq!(
            auth.user_message(),
            "Backend server is not running. Please start it with: make serve"
        );
    }

    #[test]
    fn login_failures_fall_back_to_generic_reason() {
        let with_body = ClientError::login_failed(&BackendError::Rejected {
            status: 500,
            message: "OAuth client not configured".to_string(),
        });
        let without_body = ClientError::login_failed(&BackendError::Status(502));

        assert_eq!(with_body.user_message(), "OAuth client not configured");
        assert_eq!(without_body.user_message(), "Failed to initiate login");
        assert_eq!(
            ClientError::missing_auth_url().user_message(),
            "No authorization URL received"
        );
    }

    #[test]
    fn oauth_return_uses_code_message() {
        assert_eq!(
            ClientError::OAuthReturn(OAuthReturnCode::Other("weird".to_string())).user_message(),
            "Authentication error: weird"
        );
    }
}
