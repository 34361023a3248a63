//! Core value types.
//!
//! These types enforce invariants at construction time,
//! ensuring invalid states are unrepresentable.

mod base_url;
mod side;

pub use base_url::BaseUrl;
pub use side::{AccountType, Direction};
