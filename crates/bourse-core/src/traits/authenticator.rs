//! Login trait.

use std::sync::Arc;

use async_trait::async_trait;

use crate::Result;
use crate::credentials::Credentials;

/// Performs one login against a platform's identity endpoint.
///
/// A login is a single network exchange with no retries of its own. Rejected
/// identifiers, passwords or keys are reported as
/// [`AuthError`](crate::error::AuthError).
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn login(&self) -> Result<Credentials>;
}

#[async_trait]
impl<A: Authenticator + ?Sized> Authenticator for Arc<A> {
    async fn login(&self) -> Result<Credentials> {
        (**self).login().await
    }
}
