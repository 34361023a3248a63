//! bourse-capital - Capital.com binding.
//!
//! Capital.com sessions are created with an API key, identifier and password
//! and expire after a period of inactivity. [`CapitalClient`] logs in on
//! first use and renews the session when the API reports it invalid.

mod auth;
mod client;
pub mod config;
pub mod endpoints;
pub mod markets;
pub mod orders;

pub use auth::{CapitalAuthenticator, auth_failure_rule};
pub use client::CapitalClient;
pub use config::CapitalConfig;
pub use markets::{PriceQuery, Resolution};
pub use orders::{AmendPosition, AmendWorkingOrder, OpenPosition, OrderType, Protection, WorkingOrder};
