//! Error types for the bourse client core.
//!
//! This module provides a unified error type with explicit variants for
//! transport, authentication, remote API and input validation errors.
//!
//! Every variant is `Clone`: the outcome of a single in-flight login is handed
//! to each caller that waited on it, failures included.

use std::fmt;
use thiserror::Error;

/// The unified error type for bourse operations.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// Network transport errors (connection, timeout, unreadable body).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Authentication errors (rejected login, session still rejected after renewal).
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Well-formed error responses from the remote API unrelated to authentication.
    #[error("remote error: {0}")]
    Remote(#[from] RemoteError),

    /// Input validation errors, raised before anything is sent.
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),
}

impl Error {
    /// Returns true if this is an authentication error.
    pub fn is_auth(&self) -> bool {
        matches!(self, Error::Auth(_))
    }

    /// Returns the remote error, if this is one.
    pub fn as_remote(&self) -> Option<&RemoteError> {
        match self {
            Error::Remote(remote) => Some(remote),
            _ => None,
        }
    }
}

/// Transport-level errors.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out: {message}")]
    Timeout { message: String },

    /// Generic HTTP error.
    #[error("HTTP error: {message}")]
    Http { message: String },

    /// The response body could not be read or decoded.
    #[error("unreadable response body: {message}")]
    Body { message: String },
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout {
                message: err.to_string(),
            }
        } else if err.is_connect() {
            TransportError::Connection {
                message: err.to_string(),
            }
        } else if err.is_body() || err.is_decode() {
            TransportError::Body {
                message: err.to_string(),
            }
        } else {
            TransportError::Http {
                message: err.to_string(),
            }
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Transport(TransportError::from(err))
    }
}

/// Authentication-related errors.
///
/// None of these are retried by the client.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    /// The identity endpoint rejected the identifier, password or key.
    #[error("invalid credentials (HTTP {status}){}", fmt_message(.message))]
    InvalidCredentials {
        status: u16,
        message: Option<String>,
    },

    /// The login succeeded but did not yield usable session tokens.
    #[error("malformed login response: {message}")]
    MalformedLogin { message: String },

    /// The login succeeded but no trading account is attached to it.
    #[error("no accounts available for this login")]
    NoAccounts,

    /// The request was still rejected after one re-authentication.
    #[error("session rejected by the API (HTTP {status})")]
    SessionRejected { status: u16 },
}

fn fmt_message(message: &Option<String>) -> String {
    message
        .as_deref()
        .map(|m| format!(": {}", m))
        .unwrap_or_default()
}

/// An error response from the remote API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteError {
    /// HTTP status code.
    pub status: u16,
    /// API error code (if present).
    pub code: Option<String>,
    /// Error message from the server.
    pub message: Option<String>,
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}", self.status)?;
        if let Some(ref code) = self.code {
            write!(f, " [{}]", code)?;
        }
        if let Some(ref message) = self.message {
            write!(f, ": {}", message)?;
        }
        Ok(())
    }
}

impl std::error::Error for RemoteError {}

impl RemoteError {
    /// Create a new remote error.
    pub fn new(status: u16, code: Option<String>, message: Option<String>) -> Self {
        Self {
            status,
            code,
            message,
        }
    }
}

/// Input validation errors.
#[derive(Debug, Clone, Error)]
pub enum InvalidInputError {
    /// Invalid base URL.
    #[error("invalid base URL '{value}': {reason}")]
    BaseUrl { value: String, reason: String },

    /// A header name or value that cannot be sent.
    #[error("invalid header '{name}'")]
    Header { name: String },

    /// A required configuration value is absent.
    #[error("missing configuration value: {name}")]
    MissingConfig { name: String },

    /// A request parameter was rejected.
    #[error("invalid parameter '{name}': {reason}")]
    Parameter { name: String, reason: String },

    /// A request body could not be serialized.
    #[error("unserializable request body: {message}")]
    Body { message: String },
}

impl InvalidInputError {
    /// Shorthand for a rejected parameter.
    pub fn parameter(name: impl Into<String>, reason: impl Into<String>) -> Self {
        InvalidInputError::Parameter {
            name: name.into(),
            reason: reason.into(),
        }
    }
}
