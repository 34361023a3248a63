//! Session manager for platforms whose credentials expire.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, instrument, warn};

use crate::Result;
use crate::credentials::Credentials;
use crate::error::Error;
use crate::traits::{Authenticator, SessionManager, SessionState};

/// A session that logs in on demand and re-logs in when told its
/// credentials were rejected.
///
/// # Thread Safety
///
/// Ordinary callers only take a read lock on the current credentials
/// snapshot. Logins are serialized by a separate mutex: callers that queue
/// behind an in-flight login receive that login's outcome, success or error,
/// instead of starting their own.
pub struct RenewingSession<A> {
    authenticator: A,
    current: RwLock<Option<Credentials>>,
    flight: Mutex<Flight>,
    completed: AtomicU64,
    authenticating: AtomicBool,
}

/// Outcome of the most recent login, guarded by the flight lock.
#[derive(Debug, Default)]
struct Flight {
    completed: u64,
    last_failure: Option<Error>,
}

enum Trigger {
    /// No credentials were held when the caller looked.
    Missing,
    /// The caller wants to replace the credentials of this generation.
    Replace(Option<u64>),
}

impl<A: Authenticator> RenewingSession<A> {
    /// Create a session in the `NotAuthenticated` state. Nothing is sent
    /// until the first call that needs credentials.
    pub fn new(authenticator: A) -> Self {
        Self {
            authenticator,
            current: RwLock::new(None),
            flight: Mutex::new(Flight::default()),
            completed: AtomicU64::new(0),
            authenticating: AtomicBool::new(false),
        }
    }

    /// Returns the authenticator used for logins.
    pub fn authenticator(&self) -> &A {
        &self.authenticator
    }

    /// Snapshot of the held credentials, without logging in.
    pub async fn current(&self) -> Option<Credentials> {
        self.current.read().await.clone()
    }

    /// Number of logins that ran to completion, successful or not.
    pub fn completed_logins(&self) -> u64 {
        self.completed.load(Ordering::Acquire)
    }

    async fn single_flight(&self, seen: u64, trigger: Trigger) -> Result<Credentials> {
        let mut flight = self.flight.lock().await;

        if flight.completed != seen {
            // A login finished while this caller queued for the lock.
            if let Some(err) = &flight.last_failure {
                debug!("Sharing outcome of failed login");
                return Err(err.clone());
            }
            if let Some(credentials) = self.current.read().await.clone() {
                debug!(generation = credentials.generation(), "Sharing outcome of login");
                return Ok(credentials);
            }
        }

        let held = self.current.read().await.clone();
        match (trigger, held) {
            (Trigger::Missing, Some(credentials)) => return Ok(credentials),
            (Trigger::Replace(stale), Some(credentials))
                if Some(credentials.generation()) != stale =>
            {
                debug!(generation = credentials.generation(), "Credentials already renewed");
                return Ok(credentials);
            }
            _ => {}
        }

        self.login(&mut flight).await
    }

    async fn login(&self, flight: &mut Flight) -> Result<Credentials> {
        *self.current.write().await = None;
        let generation = flight.completed + 1;

        let outcome = {
            let _authenticating = AuthenticatingGuard::enter(&self.authenticating);
            self.authenticator.login().await
        };

        let result = match outcome {
            Ok(credentials) => {
                let credentials = credentials.with_generation(generation);
                *self.current.write().await = Some(credentials.clone());
                flight.last_failure = None;
                info!(generation, account = credentials.account(), "Login succeeded");
                Ok(credentials)
            }
            Err(err) => {
                warn!(generation, error = %err, "Login failed");
                flight.last_failure = Some(err.clone());
                Err(err)
            }
        };

        flight.completed = generation;
        self.completed.store(generation, Ordering::Release);
        result
    }
}

#[async_trait]
impl<A: Authenticator> SessionManager for RenewingSession<A> {
    async fn ensure_authenticated(&self) -> Result<Credentials> {
        let seen = self.completed.load(Ordering::Acquire);
        if let Some(credentials) = self.current.read().await.clone() {
            return Ok(credentials);
        }
        self.single_flight(seen, Trigger::Missing).await
    }

    #[instrument(skip(self))]
    async fn force_refresh(&self) -> Result<Credentials> {
        info!("Refreshing session");
        let seen = self.completed.load(Ordering::Acquire);
        let stale = self.current.read().await.as_ref().map(Credentials::generation);
        self.single_flight(seen, Trigger::Replace(stale)).await
    }

    #[instrument(skip(self, stale), fields(stale_generation = stale.generation()))]
    async fn refresh_stale(&self, stale: &Credentials) -> Result<Credentials> {
        let seen = self.completed.load(Ordering::Acquire);
        self.single_flight(seen, Trigger::Replace(Some(stale.generation())))
            .await
    }

    async fn state(&self) -> SessionState {
        if self.authenticating.load(Ordering::Acquire) {
            return SessionState::Authenticating;
        }
        match self.current.read().await.as_ref() {
            Some(credentials) => SessionState::Authenticated {
                generation: credentials.generation(),
                issued_at: credentials.issued_at(),
            },
            None => SessionState::NotAuthenticated,
        }
    }
}

/// Marks a login as in flight until dropped, including when the login
/// future is cancelled.
struct AuthenticatingGuard<'a>(&'a AtomicBool);

impl<'a> AuthenticatingGuard<'a> {
    fn enter(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::Release);
        Self(flag)
    }
}

impl Drop for AuthenticatingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

// Custom Debug impl that hides credentials
impl<A> fmt::Debug for RenewingSession<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenewingSession")
            .field("completed_logins", &self.completed.load(Ordering::Relaxed))
            .field("credentials", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AuthError;
    use std::sync::atomic::AtomicUsize;

    struct Counter {
        logins: AtomicUsize,
        reject: bool,
    }

    #[async_trait]
    impl Authenticator for Counter {
        async fn login(&self) -> Result<Credentials> {
            let n = self.logins.fetch_add(1, Ordering::SeqCst) + 1;
            if self.reject {
                return Err(AuthError::InvalidCredentials {
                    status: 401,
                    message: None,
                }
                .into());
            }
            Ok(Credentials::new().with_entry("token", format!("token-{}", n)))
        }
    }

    fn session(reject: bool) -> RenewingSession<Counter> {
        RenewingSession::new(Counter {
            logins: AtomicUsize::new(0),
            reject,
        })
    }

    #[tokio::test]
    async fn starts_not_authenticated() {
        let session = session(false);
        assert_eq!(session.state().await, SessionState::NotAuthenticated);
        assert!(session.current().await.is_none());
        assert_eq!(session.authenticator().logins.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn ensure_reuses_held_credentials() {
        let session = session(false);
        let first = session.ensure_authenticated().await.unwrap();
        let second = session.ensure_authenticated().await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.generation(), 1);
        assert_eq!(session.authenticator().logins.load(Ordering::SeqCst), 1);
        assert!(session.state().await.is_authenticated());
    }

    #[tokio::test]
    async fn force_refresh_issues_new_generation() {
        let session = session(false);
        let first = session.ensure_authenticated().await.unwrap();
        let renewed = session.force_refresh().await.unwrap();

        assert_eq!(renewed.generation(), 2);
        assert_ne!(first.get("token"), renewed.get("token"));
        assert_eq!(session.completed_logins(), 2);
    }

    #[tokio::test]
    async fn refresh_of_replaced_generation_does_not_login() {
        let session = session(false);
        let first = session.ensure_authenticated().await.unwrap();
        let renewed = session.refresh_stale(&first).await.unwrap();
        let again = session.refresh_stale(&first).await.unwrap();

        assert_eq!(renewed, again);
        assert_eq!(session.authenticator().logins.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failed_login_leaves_session_unauthenticated() {
        let session = session(true);
        let err = session.ensure_authenticated().await.unwrap_err();

        assert!(err.is_auth());
        assert_eq!(session.state().await, SessionState::NotAuthenticated);

        // A later caller gets a fresh attempt.
        assert!(session.ensure_authenticated().await.is_err());
        assert_eq!(session.authenticator().logins.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn debug_hides_credentials() {
        let debug = format!("{:?}", session(false));
        assert!(debug.contains("[REDACTED]"));
    }
}
