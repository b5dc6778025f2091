use std::collections::BTreeMap;
use std::env;
use std::time::Duration;

use crate::url::{normalize_base_url, DEFAULT_API_BASE_URL};

pub const API_BASE_URL_ENV_VAR: &str = "MAILCHAT_API_BASE_URL";
pub const AUTH_BASE_URL_ENV_VAR: &str = "MAILCHAT_AUTH_BASE_URL";
pub const TIMEOUT_SEC_ENV_VAR: &str = "MAILCHAT_TIMEOUT_SEC";

/// Transport configuration for chat and auth requests.
#[derive(Debug, Clone)]
pub struct ChatApiConfig {
    /// Base URL for `/api/*` endpoints.
    pub api_base_url: String,
    /// Base URL for `/auth/*` endpoints. Falls back to `api_base_url`.
    pub auth_base_url: Option<String>,
    /// Optional `User-Agent` override.
    pub user_agent: Option<String>,
    /// Additional headers merged into every request.
    pub extra_headers: BTreeMap<String, String>,
    /// Optional request timeout. `None` keeps transport defaults.
    pub timeout: Option<Duration>,
}

impl Default for ChatApiConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            auth_base_url: None,
            user_agent: None,
            extra_headers: BTreeMap::new(),
            timeout: None,
        }
    }
}

impl ChatApiConfig {
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            ..Self::default()
        }
    }

    /// Reads base URLs and timeout from the environment. Blank values and
    /// non-positive timeouts are ignored.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(base_url) = env_string_opt(API_BASE_URL_ENV_VAR) {
            config.api_base_url = base_url;
        }
        config.auth_base_url = env_string_opt(AUTH_BASE_URL_ENV_VAR);
        config.timeout = env_string_opt(TIMEOUT_SEC_ENV_VAR)
            .and_then(|value| value.trim().parse::<u64>().ok())
            .filter(|seconds| *seconds > 0)
            .map(Duration::from_secs);
        config
    }

    pub fn with_auth_base_url(mut self, auth_base_url: impl Into<String>) -> Self {
        self.auth_base_url = Some(auth_base_url.into());
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn insert_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers.insert(key.into(), value.into());
        self
    }

    /// Normalized base URL for `/api/*` endpoints.
    pub fn api_base(&self) -> String {
        normalize_base_url(&self.api_base_url)
    }

    /// Normalized base URL for `/auth/*` endpoints.
    pub fn auth_base(&self) -> String {
        match self.auth_base_url.as_deref() {
            Some(value) if !value.trim().is_empty() => normalize_base_url(value),
            _ => self.api_base(),
        }
    }
}

fn env_string_opt(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        if value.trim().is_empty() {
            None
        } else {
            Some(value)
        }
    })
}
