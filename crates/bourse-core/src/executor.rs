//! Request execution with a single re-authentication retry.

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use crate::Result;
use crate::credentials::Credentials;
use crate::detect::AuthFailureDetector;
use crate::error::AuthError;
use crate::request::{ApiResponse, PendingRequest};
use crate::traits::SessionManager;
use crate::transport::Transport;
use crate::types::BaseUrl;

/// Sends requests with the session's credentials.
///
/// If the detector flags a response as an auth failure, the executor renews
/// the session once and resends the same request once, whether or not the
/// session produced newer credentials. A second auth failure surfaces as
/// [`AuthError::SessionRejected`]. Every other failure is returned unchanged.
pub struct RequestExecutor<S, T> {
    base_url: BaseUrl,
    session: S,
    transport: T,
    detector: Arc<dyn AuthFailureDetector>,
}

impl<S, T> RequestExecutor<S, T>
where
    S: SessionManager,
    T: Transport,
{
    pub fn new(
        base_url: BaseUrl,
        session: S,
        transport: T,
        detector: impl AuthFailureDetector + 'static,
    ) -> Self {
        Self {
            base_url,
            session,
            transport,
            detector: Arc::new(detector),
        }
    }

    pub fn base_url(&self) -> &BaseUrl {
        &self.base_url
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    /// Execute a request, renewing the session at most once.
    ///
    /// # Errors
    ///
    /// - [`Error::Auth`](crate::Error::Auth) if login fails or the request is
    ///   still rejected after renewal
    /// - [`Error::Transport`](crate::Error::Transport) on network failure
    /// - [`Error::Remote`](crate::Error::Remote) for any other non-2xx response
    #[instrument(skip(self, request), fields(method = %request.method(), path = request.path()))]
    pub async fn execute(&self, request: &PendingRequest) -> Result<ApiResponse> {
        let credentials = self.session.ensure_authenticated().await?;
        let response = self.send(request, &credentials).await?;
        if !self.detector.is_auth_failure(&response) {
            return finish(response);
        }

        warn!(
            status = %response.status(),
            generation = credentials.generation(),
            "Credentials rejected, renewing session"
        );
        let renewed = self.session.refresh_stale(&credentials).await?;
        let response = self.send(request, &renewed).await?;
        if self.detector.is_auth_failure(&response) {
            warn!(status = %response.status(), "Credentials rejected after renewal");
            return Err(AuthError::SessionRejected {
                status: response.status().as_u16(),
            }
            .into());
        }
        finish(response)
    }

    /// Execute a request and decode the JSON body of the success response.
    pub async fn execute_json<R: DeserializeOwned>(&self, request: &PendingRequest) -> Result<R> {
        self.execute(request).await?.json()
    }

    async fn send(&self, request: &PendingRequest, credentials: &Credentials) -> Result<ApiResponse> {
        let http = request.to_http(&self.base_url, credentials)?;
        let response = self.transport.send(http).await?;
        debug!(status = %response.status(), generation = credentials.generation(), "Response");
        Ok(response)
    }
}

fn finish(response: ApiResponse) -> Result<ApiResponse> {
    if response.is_success() {
        Ok(response)
    } else {
        Err(response.to_remote_error().into())
    }
}

impl<S: fmt::Debug, T> fmt::Debug for RequestExecutor<S, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestExecutor")
            .field("base_url", &self.base_url)
            .field("session", &self.session)
            .finish()
    }
}
