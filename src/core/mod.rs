//! Session data: the transcript and the per-page context controllers share.

pub mod session;
pub mod transcript;
