//! HTTP transport.
//!
//! The client core never speaks HTTP itself; it hands fully resolved
//! [`HttpRequest`]s to a [`Transport`]. [`HttpTransport`] is the reqwest-backed
//! implementation used in production.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, instrument, trace};

use crate::Result;
use crate::error::TransportError;
use crate::request::{ApiResponse, HttpRequest};

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Sends one request and buffers the whole response.
///
/// Implementations report connection-level failures as
/// [`TransportError`]; any HTTP status, including errors, is a successful send.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<ApiResponse>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, request: HttpRequest) -> Result<ApiResponse> {
        (**self).send(request).await
    }
}

/// Transport backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport with the default timeout.
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Create a transport with a custom per-request timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("bourse/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(TransportError::from)?;

        Ok(Self { client })
    }

    /// Wrap an existing client.
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[instrument(skip(self, request), fields(method = %request.method(), path = request.url().path()))]
    async fn send(&self, request: HttpRequest) -> Result<ApiResponse> {
        let (method, url, headers, body) = request.into_parts();
        debug!("Sending request");

        let mut builder = self.client.request(method, url).headers(headers);
        if let Some(body) = body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;
        trace!(status = %status, bytes = body.len(), "Response received");

        Ok(ApiResponse::new(status, headers, body))
    }
}
