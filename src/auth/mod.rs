//! Authentication gate for the pre-chat login surface.

mod code;
mod gate;

pub use code::OAuthReturnCode;
pub use gate::{
    AuthGate, GateTransitionError, LoginInstruction, LoginLabel, LoginOutcome, LoginSurface,
    RedirectTarget, SessionState,
};
