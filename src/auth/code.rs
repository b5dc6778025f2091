use std::fmt;

/// Error code carried back on the OAuth return redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OAuthReturnCode {
    AccessDenied,
    InvalidState,
    AuthFailed,
    Other(String),
}

impl OAuthReturnCode {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "access_denied" => Self::AccessDenied,
            "invalid_state" => Self::InvalidState,
            "auth_failed" => Self::AuthFailed,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::AccessDenied => "access_denied",
            Self::InvalidState => "invalid_state",
            Self::AuthFailed => "auth_failed",
            Self::Other(raw) => raw,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Self::AccessDenied => {
                "Access denied. You need to grant permission to access your Gmail.".to_string()
            }
            Self::InvalidState => "Invalid authentication state. Please try again.".to_string(),
            Self::AuthFailed => "Authentication failed. Please try again.".to_string(),
            Self::Other(raw) => format!("Authentication error: {raw}"),
        }
    }
}

impl fmt::Display for OAuthReturnCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
