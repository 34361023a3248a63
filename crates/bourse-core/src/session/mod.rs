//! Session managers.
//!
//! [`RenewingSession`] serves platforms whose session tokens expire and are
//! renewed by logging in again. [`StaticSession`] serves platforms that
//! authenticate every request with a fixed key pair.

mod fixed;
mod renewing;

pub use fixed::StaticSession;
pub use renewing::RenewingSession;
