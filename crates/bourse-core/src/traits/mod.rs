//! Core traits for login and session behavior.

mod authenticator;
mod session;

pub use authenticator::Authenticator;
pub use session::{SessionManager, SessionState};
