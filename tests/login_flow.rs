use std::sync::Arc;

use chat_backend_mock::{BackendCall, ScriptedBackend};
use mailchat::{
    AuthGate, BackendError, ClientConfig, GateTransitionError, LoginGrant, LoginInstruction,
    LoginLabel, LoginOutcome, LoginSurface, OAuthReturnCode, RedirectTarget, SessionState,
    SessionStatus,
};
use pretty_assertions::assert_eq;
use url::Url;

#[derive(Default)]
struct LoginSpy {
    errors: Vec<String>,
    control: Vec<(bool, &'static str)>,
    redirects: Vec<RedirectTarget>,
    addresses: Vec<String>,
}

impl LoginSurface for LoginSpy {
    fn apply(&mut self, instruction: LoginInstruction) {
        match instruction {
            LoginInstruction::ShowError(message) => self.errors.push(message),
            LoginInstruction::SetLoginControl { enabled, label } => {
                self.control.push((enabled, label.as_str()))
            }
            LoginInstruction::Redirect(target) => self.redirects.push(target),
            LoginInstruction::ReplaceAddress(address) => self.addresses.push(address),
        }
    }
}

fn gate(backend: &Arc<ScriptedBackend>, address: &str) -> AuthGate {
    let address = Url::parse(address).expect("valid test address");
    AuthGate::new(backend.clone(), address, &ClientConfig::default())
}

fn signed_out() -> Result<SessionStatus, BackendError> {
    Ok(SessionStatus {
        authenticated: false,
    })
}

#[tokio::test]
async fn authenticated_session_redirects_exactly_once() {
    let backend = Arc::new(ScriptedBackend::new());
    backend.push_session(Ok(SessionStatus {
        authenticated: true,
    }));
    let mut gate = gate(&backend, "http://localhost:5001/login.html");
    let mut spy = LoginSpy::default();

    assert_eq!(gate.on_load().await, Ok(SessionState::Authenticated));
    gate.flush_to(&mut spy);

    assert_eq!(
        spy.redirects,
        vec![RedirectTarget::ChatSurface("index.html".to_string())]
    );
    assert!(spy.errors.is_empty());
    assert!(spy.control.is_empty());
    assert!(spy.addresses.is_empty());
    assert_eq!(gate.initiate_login().await, Err(GateTransitionError::HandedOff));
    assert_eq!(gate.decode_return_error(), None);
}

#[tokio::test]
async fn unreachable_backend_shows_start_command() {
    let backend = Arc::new(ScriptedBackend::new());
    backend.push_session(Err(BackendError::Unreachable(
        "connection refused".to_string(),
    )));
    let mut gate = gate(&backend, "http://localhost:5001/login.html");
    let mut spy = LoginSpy::default();

    assert_eq!(gate.on_load().await, Ok(SessionState::Error));
    gate.flush_to(&mut spy);

    assert_eq!(
        spy.errors,
        vec!["Backend server is not running. Please start it with: cd backend && python app.py"]
    );
    assert!(spy.redirects.is_empty());
}

#[tokio::test]
async fn failing_session_status_is_an_error_not_signed_out() {
    let backend = Arc::new(ScriptedBackend::new());
    backend.push_session(Err(BackendError::Status(500)));
    let mut gate = gate(&backend, "http://localhost:5001/login.html");
    let mut spy = LoginSpy::default();

    assert_eq!(gate.on_load().await, Ok(SessionState::Error));
    gate.flush_to(&mut spy);

    assert_eq!(
        spy.errors,
        vec!["Backend server is not running. Please start it with: cd backend && python app.py"]
    );
    assert!(spy.redirects.is_empty());
    assert!(spy.control.is_empty());
}

#[tokio::test]
async fn access_denied_is_surfaced_once_and_stripped() {
    let backend = Arc::new(ScriptedBackend::new());
    backend.push_session(signed_out());
    let mut gate = gate(
        &backend,
        "http://localhost:5001/login.html?error=access_denied",
    );
    let mut spy = LoginSpy::default();

    assert_eq!(gate.on_load().await, Ok(SessionState::Unauthenticated));
    assert_eq!(gate.decode_return_error(), None);
    gate.flush_to(&mut spy);

    assert_eq!(
        spy.errors,
        vec!["Access denied. You need to grant permission to access your Gmail."]
    );
    assert_eq!(spy.addresses, vec!["/login.html".to_string()]);
    assert!(gate
        .address()
        .query_pairs()
        .all(|(key, _)| key != "error"));
}

#[test]
fn unrecognized_return_code_keeps_raw_value() {
    let backend = Arc::new(ScriptedBackend::new());
    let mut gate = gate(&backend, "http://localhost:5001/login.html?error=temporarily_unavailable");

    assert_eq!(
        gate.decode_return_error(),
        Some(OAuthReturnCode::Other("temporarily_unavailable".to_string()))
    );
    assert_eq!(
        gate.drain_instructions()[0],
        LoginInstruction::ShowError("Authentication error: temporarily_unavailable".to_string())
    );
}

#[tokio::test]
async fn login_redirects_to_identity_provider() {
    let backend = Arc::new(ScriptedBackend::new());
    backend.push_session(signed_out()).push_login(Ok(LoginGrant {
        auth_url: Some("https://accounts.example.test/o/oauth2/auth?state=s".to_string()),
    }));
    let mut gate = gate(&backend, "http://localhost:5001/login.html");
    let mut spy = LoginSpy::default();

    gate.on_load().await.expect("load");
    let outcome = gate.initiate_login().await.expect("login allowed");
    gate.flush_to(&mut spy);

    assert_eq!(
        outcome,
        LoginOutcome::Redirected {
            auth_url: "https://accounts.example.test/o/oauth2/auth?state=s".to_string(),
        }
    );
    assert_eq!(gate.state(), SessionState::LoginPending);
    assert_eq!(spy.control, vec![(false, "Redirecting...")]);
    assert_eq!(
        spy.redirects,
        vec![RedirectTarget::IdentityProvider(
            "https://accounts.example.test/o/oauth2/auth?state=s".to_string()
        )]
    );
    assert_eq!(
        backend.calls(),
        vec![BackendCall::SessionStatus, BackendCall::RequestLogin]
    );
}

#[tokio::test]
async fn rejected_login_restores_sign_in_control() {
    let backend = Arc::new(ScriptedBackend::new());
    backend.push_session(signed_out()).push_login(Err(BackendError::Rejected {
        status: 500,
        message: "OAuth client not configured".to_string(),
    }));
    let mut gate = gate(&backend, "http://localhost:5001/login.html");
    let mut spy = LoginSpy::default();

    gate.on_load().await.expect("load");
    let outcome = gate.initiate_login().await.expect("login allowed");
    gate.flush_to(&mut spy);

    assert!(matches!(outcome, LoginOutcome::Failed(_)));
    assert_eq!(gate.state(), SessionState::Unauthenticated);
    assert_eq!(spy.errors, vec!["OAuth client not configured"]);
    assert_eq!(
        spy.control,
        vec![(false, "Redirecting..."), (true, "Sign in with Google")]
    );
    assert!(spy.redirects.is_empty());
    assert_eq!(LoginLabel::SignIn.as_str(), "Sign in with Google");
}

#[tokio::test]
async fn bare_status_failure_uses_generic_message() {
    let backend = Arc::new(ScriptedBackend::new());
    backend
        .push_session(signed_out())
        .push_login(Err(BackendError::Status(502)));
    let mut gate = gate(&backend, "http://localhost:5001/login.html");

    gate.on_load().await.expect("load");
    gate.initiate_login().await.expect("login allowed");

    let errors: Vec<LoginInstruction> = gate
        .drain_instructions()
        .into_iter()
        .filter(|instruction| matches!(instruction, LoginInstruction::ShowError(_)))
        .collect();
    assert_eq!(
        errors,
        vec![LoginInstruction::ShowError("Failed to initiate login".to_string())]
    );
}
