//! Session manager for credentials that never expire.

use std::fmt;

use async_trait::async_trait;

use crate::Result;
use crate::credentials::Credentials;
use crate::traits::{SessionManager, SessionState};

/// A session over a static key pair.
///
/// Every operation returns the same credentials; refreshing is a no-op.
/// The interface matches [`RenewingSession`](super::RenewingSession) so the
/// executor's retry logic does not depend on the platform.
#[derive(Clone)]
pub struct StaticSession {
    credentials: Credentials,
}

impl StaticSession {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials: credentials.with_generation(1),
        }
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }
}

#[async_trait]
impl SessionManager for StaticSession {
    async fn ensure_authenticated(&self) -> Result<Credentials> {
        Ok(self.credentials.clone())
    }

    async fn force_refresh(&self) -> Result<Credentials> {
        Ok(self.credentials.clone())
    }

    async fn refresh_stale(&self, _stale: &Credentials) -> Result<Credentials> {
        Ok(self.credentials.clone())
    }

    async fn state(&self) -> SessionState {
        SessionState::Authenticated {
            generation: self.credentials.generation(),
            issued_at: self.credentials.issued_at(),
        }
    }
}

impl fmt::Debug for StaticSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticSession")
            .field("credentials", &self.credentials)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::secret::Secret;

    #[tokio::test]
    async fn refresh_returns_identical_credentials() {
        let session = StaticSession::new(
            Credentials::new()
                .with_entry("x-api-key", Secret::new("api"))
                .with_entry("x-user-key", Secret::new("user")),
        );

        let original = session.ensure_authenticated().await.unwrap();
        let refreshed = session.force_refresh().await.unwrap();
        let renewed = session.refresh_stale(&original).await.unwrap();

        assert_eq!(original, refreshed);
        assert_eq!(original, renewed);
        assert!(session.state().await.is_authenticated());
    }

    #[test]
    fn debug_hides_keys() {
        let session = StaticSession::new(Credentials::new().with_entry("x-api-key", "api-secret"));
        let debug = format!("{:?}", session);
        assert!(debug.contains("x-api-key"));
        assert!(!debug.contains("api-secret"));
    }
}
