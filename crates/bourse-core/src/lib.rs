//! bourse-core - Session-managed API client core.
//!
//! All authenticated traffic flows through a [`RequestExecutor`], which takes
//! credentials from a [`SessionManager`] and, when the API reports that they
//! are no longer valid, renews the session once and retries the request once.
//!
//! # Example
//!
//! ```no_run
//! use bourse_core::{
//!     AuthFailureRule, BaseUrl, Credentials, HttpTransport, PendingRequest, RequestExecutor,
//!     Secret, StaticSession,
//! };
//!
//! # async fn example() -> Result<(), bourse_core::Error> {
//! let session = StaticSession::new(
//!     Credentials::new().with_entry("x-api-key", Secret::new("key")),
//! );
//! let executor = RequestExecutor::new(
//!     BaseUrl::new("https://api.example.com")?,
//!     session,
//!     HttpTransport::new()?,
//!     AuthFailureRule::unauthorized(),
//! );
//!
//! let response = executor.execute(&PendingRequest::get("/api/v1/ping")).await?;
//! println!("{}", response.text());
//! # Ok(())
//! # }
//! ```

pub mod credentials;
pub mod detect;
pub mod error;
pub mod executor;
pub mod request;
pub mod secret;
pub mod session;
pub mod traits;
pub mod transport;
pub mod types;

pub use credentials::{CredentialEntry, Credentials};
pub use detect::{AuthFailureDetector, AuthFailureRule};
pub use error::Error;
pub use executor::RequestExecutor;
pub use request::{ApiResponse, HttpRequest, Injection, PendingRequest, check_path_segment};
pub use secret::Secret;
pub use session::{RenewingSession, StaticSession};
pub use traits::{Authenticator, SessionManager, SessionState};
pub use transport::{HttpTransport, Transport};
pub use types::{AccountType, BaseUrl, Direction};

// Re-exported so downstream crates and tests name the same HTTP types.
pub use reqwest::header::HeaderMap;
pub use reqwest::{Method, StatusCode};

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
