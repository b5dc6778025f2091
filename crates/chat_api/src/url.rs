use url::Url;

use crate::error::ChatApiError;

/// Default base URL for the chat backend.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5001";

pub const CHAT_PATH: &str = "/api/chat";
pub const DOWNLOAD_ATTACHMENT_PATH: &str = "/api/download-attachment";
pub const HEALTH_PATH: &str = "/api/health";
pub const SESSION_STATUS_PATH: &str = "/auth/user";
pub const LOGIN_PATH: &str = "/auth/login";

/// Normalize a configured base URL.
///
/// Normalization rules:
/// 1) blank input falls back to [`DEFAULT_API_BASE_URL`]
/// 2) surrounding whitespace and trailing `/` are removed
pub fn normalize_base_url(input: &str) -> String {
    let base = if input.trim().is_empty() {
        DEFAULT_API_BASE_URL
    } else {
        input.trim()
    };

    base.trim_end_matches('/').to_string()
}

/// Join a normalized base URL with an absolute endpoint path.
pub fn endpoint_url(base: &str, path: &str) -> Result<Url, ChatApiError> {
    let joined = format!("{}/{}", normalize_base_url(base), path.trim_start_matches('/'));
    let url = Url::parse(&joined).map_err(|error| {
        ChatApiError::InvalidBaseUrl(format!("{base} ({error})"))
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ChatApiError::InvalidBaseUrl(format!(
            "{base} (unsupported scheme '{}')",
            url.scheme()
        )));
    }

    Ok(url)
}
