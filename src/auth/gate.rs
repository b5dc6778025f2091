//! Login-surface state machine: session check, login initiation, and
//! decoding of the OAuth return error.

use std::fmt;
use std::sync::Arc;

use chat_backend::AuthBackend;
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

use crate::auth::OAuthReturnCode;
use crate::config::ClientConfig;
use crate::error::ClientError;

const RETURN_ERROR_PARAM: &str = "error";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Checking,
    Authenticated,
    Unauthenticated,
    LoginPending,
    Error,
}

impl SessionState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Checking => "CHECKING",
            Self::Authenticated => "AUTHENTICATED",
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::LoginPending => "LOGIN_PENDING",
            Self::Error => "ERROR",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginLabel {
    SignIn,
    Redirecting,
}

impl LoginLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SignIn => "Sign in with Google",
            Self::Redirecting => "Redirecting...",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectTarget {
    ChatSurface(String),
    IdentityProvider(String),
}

/// One visible mutation of the login surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginInstruction {
    ShowError(String),
    SetLoginControl { enabled: bool, label: LoginLabel },
    Redirect(RedirectTarget),
    /// Replace the current address without navigating.
    ReplaceAddress(String),
}

pub trait LoginSurface {
    fn apply(&mut self, instruction: LoginInstruction);
}

impl<F> LoginSurface for F
where
    F: FnMut(LoginInstruction),
{
    fn apply(&mut self, instruction: LoginInstruction) {
        self(instruction)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GateTransitionError {
    #[error("{operation} is not allowed in state {state}")]
    InvalidTransition {
        operation: &'static str,
        state: SessionState,
    },

    #[error("control was handed off by a redirect")]
    HandedOff,
}

/// Result of a settled login initiation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    Redirected { auth_url: String },
    Failed(ClientError),
}

pub struct AuthGate {
    backend: Arc<dyn AuthBackend>,
    state: SessionState,
    address: Url,
    chat_surface: String,
    start_command: String,
    outbox: Vec<LoginInstruction>,
    handed_off: bool,
    last_error: Option<ClientError>,
}

impl AuthGate {
    pub fn new(backend: Arc<dyn AuthBackend>, address: Url, config: &ClientConfig) -> Self {
        Self {
            backend,
            state: SessionState::Checking,
            address,
            chat_surface: config.chat_surface.clone(),
            start_command: config.backend_start_command.clone(),
            outbox: Vec::new(),
            handed_off: false,
            last_error: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn address(&self) -> &Url {
        &self.address
    }

    pub fn is_handed_off(&self) -> bool {
        self.handed_off
    }

    pub fn last_error(&self) -> Option<&ClientError> {
        self.last_error.as_ref()
    }

    /// Load sequence of the login surface: return error first, then the
    /// session check.
    pub async fn on_load(&mut self) -> Result<SessionState, GateTransitionError> {
        self.decode_return_error();
        self.check_session().await
    }

    pub async fn check_session(&mut self) -> Result<SessionState, GateTransitionError> {
        self.ensure_allowed("check_session", &[SessionState::Checking])?;

        match self.backend.session_status().await {
            Ok(status) if status.authenticated => {
                self.transition(SessionState::Authenticated);
                let target = RedirectTarget::ChatSurface(self.chat_surface.clone());
                self.redirect(target);
            }
            Ok(_) => self.transition(SessionState::Unauthenticated),
            Err(source) => {
                warn!(error = %source, "session check failed");
                self.transition(SessionState::Error);
                self.surface_error(ClientError::AuthProbe {
                    source,
                    start_command: self.start_command.clone(),
                });
            }
        }

        Ok(self.state)
    }

    pub async fn initiate_login(&mut self) -> Result<LoginOutcome, GateTransitionError> {
        self.ensure_allowed(
            "initiate_login",
            &[SessionState::Unauthenticated, SessionState::Error],
        )?;

        self.transition(SessionState::LoginPending);
        self.emit(LoginInstruction::SetLoginControl {
            enabled: false,
            label: LoginLabel::Redirecting,
        });

        let error = match self.backend.request_login().await {
            Ok(grant) => match grant.auth_url {
                Some(auth_url) => {
                    self.redirect(RedirectTarget::IdentityProvider(auth_url.clone()));
                    return Ok(LoginOutcome::Redirected { auth_url });
                }
                None => ClientError::missing_auth_url(),
            },
            Err(source) => {
                warn!(error = %source, "login initiation failed");
                ClientError::login_failed(&source)
            }
        };

        self.transition(SessionState::Unauthenticated);
        self.surface_error(error.clone());
        self.emit(LoginInstruction::SetLoginControl {
            enabled: true,
            label: LoginLabel::SignIn,
        });
        Ok(LoginOutcome::Failed(error))
    }

    /// Surfaces the return-redirect error once and strips it from the address.
    /// Calling again finds nothing and does nothing.
    pub fn decode_return_error(&mut self) -> Option<OAuthReturnCode> {
        if self.handed_off {
            return None;
        }

        let raw = self
            .address
            .query_pairs()
            .find(|(key, _)| key == RETURN_ERROR_PARAM)
            .map(|(_, value)| value.into_owned())
            .filter(|value| !value.is_empty())?;

        let code = OAuthReturnCode::parse(&raw);
        debug!(code = %code, "decoded oauth return error");
        self.surface_error(ClientError::OAuthReturn(code.clone()));

        self.address.set_query(None);
        self.address.set_fragment(None);
        self.emit(LoginInstruction::ReplaceAddress(self.address.path().to_string()));

        Some(code)
    }

    pub fn drain_instructions(&mut self) -> Vec<LoginInstruction> {
        std::mem::take(&mut self.outbox)
    }

    pub fn flush_to(&mut self, surface: &mut dyn LoginSurface) -> usize {
        let instructions = self.drain_instructions();
        let applied = instructions.len();
        for instruction in instructions {
            surface.apply(instruction);
        }
        applied
    }

    fn ensure_allowed(
        &self,
        operation: &'static str,
        allowed: &[SessionState],
    ) -> Result<(), GateTransitionError> {
        if self.handed_off {
            return Err(GateTransitionError::HandedOff);
        }
        if !allowed.contains(&self.state) {
            return Err(GateTransitionError::InvalidTransition {
                operation,
                state: self.state,
            });
        }
        Ok(())
    }

    fn transition(&mut self, next: SessionState) {
        info!(from = %self.state, to = %next, "auth gate transition");
        self.state = next;
    }

    fn redirect(&mut self, target: RedirectTarget) {
        self.handed_off = true;
        self.emit(LoginInstruction::Redirect(target));
    }

    fn surface_error(&mut self, error: ClientError) {
        self.emit(LoginInstruction::ShowError(error.user_message()));
        self.last_error = Some(error);
    }

    fn emit(&mut self, instruction: LoginInstruction) {
        self.outbox.push(instruction);
    }
}

impl fmt::Debug for AuthGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthGate")
            .field("state", &self.state)
            .field("address", &self.address.as_str())
            .field("handed_off", &self.handed_off)
            .finish_non_exhaustive()
    }
}
