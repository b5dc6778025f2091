use std::fmt;

use chat_backend::BackendError;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Error as JsonError;

#[derive(Debug)]
pub enum ChatApiError {
    InvalidBaseUrl(String),
    InvalidHeader(String),
    Request(reqwest::Error),
    Status(StatusCode, Option<String>),
    Serde(JsonError),
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorPayload {
    #[serde(default)]
    pub error: Option<String>,
}

impl fmt::Display for ChatApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidBaseUrl(value) => write!(f, "invalid base URL: {value}"),
            Self::InvalidHeader(value) => write!(f, "invalid header: {value}"),
            Self::Request(error) => write!(f, "request error: {error}"),
            Self::Status(status, Some(message)) => write!(f, "HTTP {status} {message}"),
            Self::Status(status, None) => write!(f, "HTTP error! status: {}", status.as_u16()),
            Self::Serde(error) => write!(f, "serialization error: {error}"),
        }
    }
}

impl std::error::Error for ChatApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Request(error) => Some(error),
            Self::Serde(error) => Some(error),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ChatApiError {
    fn from(error: reqwest::Error) -> Self {
        Self::Request(error)
    }
}

impl From<JsonError> for ChatApiError {
    fn from(error: JsonError) -> Self {
        Self::Serde(error)
    }
}

impl From<ChatApiError> for BackendError {
    fn from(error: ChatApiError) -> Self {
        match error {
            ChatApiError::Status(status, Some(message)) => BackendError::Rejected {
                status: status.as_u16(),
                message,
            },
            ChatApiError::Status(status, None) => BackendError::Status(status.as_u16()),
            ChatApiError::Serde(error) => BackendError::Malformed(error.to_string()),
            ChatApiError::Request(error) if error.is_decode() => {
                BackendError::Malformed(error.to_string())
            }
            ChatApiError::Request(error) => BackendError::Unreachable(error.to_string()),
            other => BackendError::Unreachable(other.to_string()),
        }
    }
}

/// Extracts the backend's `{"error": "..."}` message from a failure body.
///
/// Returns `None` for non-JSON bodies and blank messages so callers can fall
/// back to their own wording.
pub fn parse_error_message(body: &str) -> Option<String> {
    let parsed = serde_json::from_str::<ErrorPayload>(body).ok()?;
    parsed
        .error
        .map(|message| message.trim().to_string())
        .filter(|message| !message.is_empty())
}
