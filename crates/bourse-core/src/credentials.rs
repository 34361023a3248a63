//! Issued credentials.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::secret::Secret;

/// A single named secret injected into outgoing requests.
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialEntry {
    name: String,
    value: Secret,
}

impl CredentialEntry {
    /// Header name or query key under which the value is sent.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The secret value.
    pub fn value(&self) -> &Secret {
        &self.value
    }
}

/// The bundle of tokens or keys that authorizes a request.
///
/// Credentials are immutable once issued. Renewal produces a new value with a
/// higher [`generation`](Credentials::generation) that replaces the old one.
///
/// # Security
///
/// Secret values are never exposed in Debug output; only entry names are shown.
///
/// # Example
///
/// ```
/// use bourse_core::{Credentials, Secret};
///
/// let creds = Credentials::new()
///     .with_entry("x-api-key", Secret::new("key"))
///     .with_entry("x-user-key", Secret::new("user"));
/// assert_eq!(creds.entries().count(), 2);
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    entries: Arc<[CredentialEntry]>,
    account: Option<String>,
    generation: u64,
    issued_at: DateTime<Utc>,
}

impl Credentials {
    /// Create an empty bundle issued now.
    pub fn new() -> Self {
        Self {
            entries: Arc::from(Vec::new()),
            account: None,
            generation: 0,
            issued_at: Utc::now(),
        }
    }

    /// Add a named secret to the bundle.
    pub fn with_entry(self, name: impl Into<String>, value: impl Into<Secret>) -> Self {
        let mut entries = self.entries.to_vec();
        entries.push(CredentialEntry {
            name: name.into(),
            value: value.into(),
        });
        Self {
            entries: Arc::from(entries),
            ..self
        }
    }

    /// Bind the bundle to an account identifier.
    pub fn with_account(self, account: impl Into<String>) -> Self {
        Self {
            account: Some(account.into()),
            ..self
        }
    }

    pub(crate) fn with_generation(self, generation: u64) -> Self {
        Self { generation, ..self }
    }

    /// Iterate over the named secrets.
    pub fn entries(&self) -> impl Iterator<Item = &CredentialEntry> {
        self.entries.iter()
    }

    /// Look up a secret by name (case-insensitive).
    pub fn get(&self, name: &str) -> Option<&Secret> {
        self.entries
            .iter()
            .find(|e| e.name.eq_ignore_ascii_case(name))
            .map(|e| &e.value)
    }

    /// The account these credentials are bound to, if the platform reports one.
    pub fn account(&self) -> Option<&str> {
        self.account.as_deref()
    }

    /// Sequence number of the login that issued these credentials.
    ///
    /// Zero until a session manager adopts the bundle.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// When the credentials were issued.
    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }
}

impl Default for Credentials {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.entries.iter().map(|e| e.name.as_str()).collect();
        f.debug_struct("Credentials")
            .field("entries", &names)
            .field("account", &self.account)
            .field("generation", &self.generation)
            .field("issued_at", &self.issued_at)
            .finish()
    }
}

impl fmt::Debug for CredentialEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialEntry")
            .field("name", &self.name)
            .field("value", &self.value)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_hide_values_in_debug() {
        let creds = Credentials::new()
            .with_entry("CST", Secret::new("cst-secret"))
            .with_account("ACC-1");
        let debug = format!("{:?}", creds);
        assert!(debug.contains("CST"));
        assert!(debug.contains("ACC-1"));
        assert!(!debug.contains("cst-secret"));
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let creds = Credentials::new().with_entry("X-SECURITY-TOKEN", "tok");
        assert_eq!(creds.get("x-security-token").map(Secret::expose), Some("tok"));
        assert!(creds.get("CST").is_none());
    }

    #[test]
    fn generation_is_part_of_identity() {
        let base = Credentials::new().with_entry("x-api-key", "k");
        let first = base.clone().with_generation(1);
        let second = base.with_generation(2);
        assert_ne!(first, second);
        assert_eq!(first.clone(), first);
    }
}
