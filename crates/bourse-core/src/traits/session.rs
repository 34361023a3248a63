//! Session manager trait.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::Result;
use crate::credentials::Credentials;

/// The lifecycle stage of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No credentials are held.
    NotAuthenticated,
    /// A login is in flight; callers wait for its outcome.
    Authenticating,
    /// Credentials are held.
    Authenticated {
        generation: u64,
        issued_at: DateTime<Utc>,
    },
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated { .. })
    }
}

/// Owner of a client's credentials and their validity.
///
/// Implementations guarantee that at most one login is in flight at a time;
/// concurrent callers wait on it and share its outcome.
#[async_trait]
pub trait SessionManager: Send + Sync {
    /// Returns the current credentials, logging in first if none are held.
    async fn ensure_authenticated(&self) -> Result<Credentials>;

    /// Discards the current credentials and logs in again.
    async fn force_refresh(&self) -> Result<Credentials>;

    /// Renews credentials that the API just rejected.
    ///
    /// If `stale` was already replaced by a newer generation, the newer
    /// credentials are returned without another login.
    async fn refresh_stale(&self, stale: &Credentials) -> Result<Credentials>;

    /// The current lifecycle stage.
    async fn state(&self) -> SessionState;
}

#[async_trait]
impl<S: SessionManager + ?Sized> SessionManager for Arc<S> {
    async fn ensure_authenticated(&self) -> Result<Credentials> {
        (**self).ensure_authenticated().await
    }

    async fn force_refresh(&self) -> Result<Credentials> {
        (**self).force_refresh().await
    }

    async fn refresh_stale(&self, stale: &Credentials) -> Result<Credentials> {
        (**self).refresh_stale(stale).await
    }

    async fn state(&self) -> SessionState {
        (**self).state().await
    }
}
