//! Secret values used for authentication.

use std::fmt;

/// A password, API key or session token.
///
/// # Security
///
/// - Never logged or displayed in Debug output
/// - Treat as opaque; do not parse or inspect
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    /// Wrap a secret value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the raw value.
    ///
    /// # Security
    ///
    /// Use only when constructing authentication headers or login bodies.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Returns true if the secret is the empty string.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for Secret {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Secret {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

// Hide secret value in Debug output
impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Secret").field(&"[REDACTED]").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secret_hides_value_in_debug() {
        let secret = Secret::new("eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...");
        let debug = format!("{:?}", secret);
        assert!(!debug.contains("eyJ"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn secret_exposes_raw_value() {
        let secret = Secret::from("api-key-123");
        assert_eq!(secret.expose(), "api-key-123");
        assert!(!secret.is_empty());
        assert!(Secret::new("").is_empty());
    }
}
