//! Environment configuration.

use std::env;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5001";
pub const DEFAULT_CHAT_SURFACE: &str = "index.html";
pub const DEFAULT_BACKEND_START_COMMAND: &str = "cd backend && python app.py";

const API_BASE_URL_ENV: &str = "MAILCHAT_API_BASE_URL";
const CHAT_SURFACE_ENV: &str = "MAILCHAT_CHAT_SURFACE";
const BACKEND_START_COMMAND_ENV: &str = "MAILCHAT_BACKEND_START_COMMAND";

/// Values the controllers surface to the user or redirect to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Shown in transport failure messages.
    pub api_base_url: String,
    /// Redirect target once a session is authenticated.
    pub chat_surface: String,
    /// Shown in unreachable-backend diagnostics.
    pub backend_start_command: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            chat_surface: DEFAULT_CHAT_SURFACE.to_string(),
            backend_start_command: DEFAULT_BACKEND_START_COMMAND.to_string(),
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_base_url: env_string_opt(API_BASE_URL_ENV).unwrap_or(defaults.api_base_url),
            chat_surface: env_string_opt(CHAT_SURFACE_ENV).unwrap_or(defaults.chat_surface),
            backend_start_command: env_string_opt(BACKEND_START_COMMAND_ENV)
                .unwrap_or(defaults.backend_start_command),
        }
    }

    #[must_use]
    pub fn with_api_base_url(mut self, api_base_url: impl Into<String>) -> Self {
        self.api_base_url = api_base_url.into();
        self
    }

    #[must_use]
    pub fn with_chat_surface(mut self, chat_surface: impl Into<String>) -> Self {
        self.chat_surface = chat_surface.into();
        self
    }

    #[must_use]
    pub fn with_backend_start_command(mut self, command: impl Into<String>) -> Self {
        self.backend_start_command = command.into();
        self
    }
}

fn env_string_opt(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        let value = value.trim();
        if value.is_empty() {
            None
        } else {
            Some(value.to_string())
        }
    })
}

#[cfg(test)]
mod tests {
    use super::{ClientConfig, DEFAULT_API_BASE_URL, DEFAULT_BACKEND_START_COMMAND};
    use std::env;
    use std::sync::{Mutex, OnceLock};

    struct EnvGuard {
        key: &'static str,
        previous: Option<String>,
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            if let Some(value) = &self.previous {
                env::set_var(self.key, value);
            } else {
                env::remove_var(self.key);
            }
        }
    }

    fn env_lock() -> std::sync::MutexGuard<'static, ()> {
        static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        LOCK.get_or_init(|| Mutex::new(()))
            .lock()
            .expect("env lock poisoned")
    }

    fn set_env_guard(key: &'static str, value: Option<&str>) -> EnvGuard {
        let previous = env::var(key).ok();
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
        EnvGuard { key, previous }
    }

    #[test]
    fn unset_env_uses_defaults() {
        let _lock = env_lock();
        let _g1 = set_env_guard("MAILCHAT_API_BASE_URL", None);
        let _g2 = set_env_guard("MAILCHAT_CHAT_SURFACE", None);
        let _g3 = set_env_guard("MAILCHAT_BACKEND_START_COMMAND", None);

        let config = ClientConfig::from_env();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.chat_surface, "index.html");
        assert_eq!(config.backend_start_command, DEFAULT_BACKEND_START_COMMAND);
    }

    #[test]
    fn env_values_override_defaults() {
        let _lock = env_lock();
        let _g1 = set_env_guard("MAILCHAT_API_BASE_URL", Some("https://mail.example.test"));
        let _g2 = set_env_guard("MAILCHAT_CHAT_SURFACE", Some("/chat"));
        let _g3 = set_env_guard("MAILCHAT_BACKEND_START_COMMAND", Some("make serve"));

        let config = ClientConfig::from_env();
        assert_eq!(config.api_base_url, "https://mail.example.test");
        assert_eq!(config.chat_surface, "/chat");
        assert_eq!(config.backend_start_command, "make serve");
    }

    #[test]
    fn blank_env_values_are_ignored() {
        let _lock = env_lock();
        let _g1 = set_env_guard("MAILCHAT_API_BASE_URL", Some("   "));
        let _g2 = set_env_guard("MAILCHAT_CHAT_SURFACE", Some(""));

        let config = ClientConfig::from_env();
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.chat_surface, "index.html");
    }
}
