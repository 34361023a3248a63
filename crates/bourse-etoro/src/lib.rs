//! bourse-etoro - eToro binding.
//!
//! eToro authenticates every request with a static API key and user key.
//! The keys never expire, so a rejected request is reported rather than
//! retried.

mod client;
pub mod config;
pub mod positions;

pub use client::{EtoroClient, InstrumentSearch, auth_failure_rule};
pub use config::EtoroConfig;
pub use positions::{AmendPosition, OpenPosition};
