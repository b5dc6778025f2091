use async_trait::async_trait;
use chat_backend::{
    Attachment, AttachmentPayload, AuthBackend, BackendError, ChatBackend, ChatOutcome,
    HealthReport, LoginGrant, SessionStatus,
};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE, USER_AGENT};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::ChatApiConfig;
use crate::error::{parse_error_message, ChatApiError};
use crate::payload::{
    AttachmentRequest, ChatRequest, ChatResponseBody, HealthBody, LoginBody, SessionBody,
};
use crate::url::{
    endpoint_url, CHAT_PATH, DOWNLOAD_ATTACHMENT_PATH, HEALTH_PATH, LOGIN_PATH,
    SESSION_STATUS_PATH,
};

/// HTTP client for the chat backend and its auth endpoints.
///
/// The underlying client keeps a cookie store so `/auth/*` calls carry the
/// session cookie set during the OAuth round trip.
#[derive(Debug)]
pub struct ChatApiClient {
    http: Client,
    config: ChatApiConfig,
}

impl ChatApiClient {
    pub fn new(config: ChatApiConfig) -> Result<Self, ChatApiError> {
        let mut builder = Client::builder()
            .cookie_store(true)
            .default_headers(build_headers(&config)?);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(ChatApiError::from)?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ChatApiConfig {
        &self.config
    }

    pub fn build_chat_request(&self, message: &str) -> Result<RequestBuilder, ChatApiError> {
        let url = endpoint_url(&self.config.api_base(), CHAT_PATH)?;
        Ok(self.http.post(url).json(&ChatRequest::new(message)))
    }

    pub fn build_download_request(
        &self,
        attachment: &Attachment,
    ) -> Result<RequestBuilder, ChatApiError> {
        let url = endpoint_url(&self.config.api_base(), DOWNLOAD_ATTACHMENT_PATH)?;
        Ok(self
            .http
            .post(url)
            .json(&AttachmentRequest::from(attachment)))
    }

    pub fn build_health_request(&self) -> Result<RequestBuilder, ChatApiError> {
        let url = endpoint_url(&self.config.api_base(), HEALTH_PATH)?;
        Ok(self.http.get(url))
    }

    pub fn build_session_request(&self) -> Result<RequestBuilder, ChatApiError> {
        let url = endpoint_url(&self.config.auth_base(), SESSION_STATUS_PATH)?;
        Ok(self.http.get(url))
    }

    pub fn build_login_request(&self) -> Result<RequestBuilder, ChatApiError> {
        let url = endpoint_url(&self.config.auth_base(), LOGIN_PATH)?;
        Ok(self.http.get(url))
    }

    /// Sends one chat message.
    ///
    /// Any non-success status is a transport failure regardless of body; a
    /// success body carrying `error` is an application-level rejection.
    pub async fn chat(&self, message: &str) -> Result<ChatOutcome, ChatApiError> {
        let response = self.build_chat_request(message)?.send().await?;
        let status = response.status();
        if !status.is_success() {
            debug!(status = status.as_u16(), "chat request returned non-success status");
            return Err(ChatApiError::Status(status, None));
        }

        let body: ChatResponseBody = read_json(response).await?;
        Ok(body.into_outcome())
    }

    pub async fn download_attachment(
        &self,
        attachment: &Attachment,
    ) -> Result<AttachmentPayload, ChatApiError> {
        let response = self.build_download_request(attachment)?.send().await?;
        let response = ensure_success(response).await?;
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().await?;

        Ok(AttachmentPayload {
            bytes: bytes.to_vec(),
            content_type,
        })
    }

    /// Health probe. The body is optional and decoded leniently.
    pub async fn health(&self) -> Result<HealthReport, ChatApiError> {
        let response = self.build_health_request()?.send().await?;
        let response = ensure_success(response).await?;
        let body = response.text().await?;
        let parsed = serde_json::from_str::<HealthBody>(&body).unwrap_or_default();
        Ok(parsed.into())
    }

    pub async fn session_status(&self) -> Result<SessionStatus, ChatApiError> {
        let response = self.build_session_request()?.send().await?;
        let response = ensure_success(response).await?;
        let body: SessionBody = read_json(response).await?;
        Ok(body.into())
    }

    pub async fn request_login(&self) -> Result<LoginGrant, ChatApiError> {
        let response = self.build_login_request()?.send().await?;
        let response = ensure_success(response).await?;
        let body: LoginBody = read_json(response).await?;
        Ok(body.into())
    }
}

#[async_trait]
impl ChatBackend for ChatApiClient {
    async fn send_message(&self, message: &str) -> Result<ChatOutcome, BackendError> {
        self.chat(message).await.map_err(BackendError::from)
    }

    async fn download_attachment(
        &self,
        attachment: &Attachment,
    ) -> Result<AttachmentPayload, BackendError> {
        ChatApiClient::download_attachment(self, attachment)
            .await
            .map_err(BackendError::from)
    }

    async fn health(&self) -> Result<HealthReport, BackendError> {
        ChatApiClient::health(self).await.map_err(BackendError::from)
    }
}

#[async_trait]
impl AuthBackend for ChatApiClient {
    async fn session_status(&self) -> Result<SessionStatus, BackendError> {
        ChatApiClient::session_status(self)
            .await
            .map_err(BackendError::from)
    }

    async fn request_login(&self) -> Result<LoginGrant, BackendError> {
        ChatApiClient::request_login(self)
            .await
            .map_err(BackendError::from)
    }
}

fn build_headers(config: &ChatApiConfig) -> Result<HeaderMap, ChatApiError> {
    let mut out = HeaderMap::new();
    if let Some(user_agent) = config
        .user_agent
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
    {
        out.insert(
            USER_AGENT,
            HeaderValue::from_str(user_agent)
                .map_err(|_| ChatApiError::InvalidHeader(USER_AGENT.to_string()))?,
        );
    }

    for (key, value) in &config.extra_headers {
        out.insert(
            HeaderName::from_bytes(key.as_bytes())
                .map_err(|_| ChatApiError::InvalidHeader(format!("invalid header key: {key}")))?,
            HeaderValue::from_str(value)
                .map_err(|_| ChatApiError::InvalidHeader(format!("invalid value for {key}")))?,
        );
    }
    Ok(out)
}

/// Passes success responses through; converts the rest into
/// [`ChatApiError::Status`] carrying the body's `error` message when present.
async fn ensure_success(response: Response) -> Result<Response, ChatApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = match response.text().await {
        Ok(body) => body,
        Err(error) => {
            warn!(status = status.as_u16(), %error, "failed to read error body");
            String::new()
        }
    };
    Err(ChatApiError::Status(status, parse_error_message(&body)))
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ChatApiError> {
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(ChatApiError::from)
}
