//! eToro REST client.

use std::fmt;
use std::sync::Arc;

use serde_json::{Value, json};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use bourse_core::error::{AuthError, InvalidInputError};
use bourse_core::{
    AccountType, ApiResponse, AuthFailureRule, Credentials, Error, HttpTransport, Method,
    PendingRequest, RequestExecutor, Result, StaticSession, Transport,
};

use crate::config::EtoroConfig;
use crate::positions::{AmendPosition, OpenPosition, require_instrument, require_position};

pub const API_KEY_HEADER: &str = "x-api-key";
pub const USER_KEY_HEADER: &str = "x-user-key";
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// eToro reports invalid keys with HTTP 401 and nothing else.
pub fn auth_failure_rule() -> AuthFailureRule {
    AuthFailureRule::unauthorized()
}

/// Parameters of `GET /instruments/search`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstrumentSearch {
    pub query: Option<String>,
    /// e.g. `stocks`, `crypto`, `currencies`.
    pub category: Option<String>,
    pub limit: u32,
}

impl Default for InstrumentSearch {
    fn default() -> Self {
        Self {
            query: None,
            category: None,
            limit: 10,
        }
    }
}

impl InstrumentSearch {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: Some(query.into()),
            ..Default::default()
        }
    }
}

type EtoroExecutor = RequestExecutor<StaticSession, Arc<dyn Transport>>;

/// An eToro client.
///
/// Every request carries the key pair and its own `x-request-id`. Clones
/// share one executor.
#[derive(Clone)]
pub struct EtoroClient {
    executor: Arc<EtoroExecutor>,
    account_type: AccountType,
    prefix: &'static str,
}

impl EtoroClient {
    pub fn new(config: EtoroConfig) -> Result<Self> {
        Self::with_transport(config, Arc::new(HttpTransport::new()?))
    }

    pub fn with_transport(config: EtoroConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        let credentials = Credentials::new()
            .with_entry(API_KEY_HEADER, config.api_key().clone())
            .with_entry(USER_KEY_HEADER, config.user_key().clone());
        let executor = RequestExecutor::new(
            config.base_url()?,
            StaticSession::new(credentials),
            transport,
            auth_failure_rule(),
        );
        Ok(Self {
            executor: Arc::new(executor),
            account_type: config.account_type(),
            prefix: config.path_prefix(),
        })
    }

    pub fn account_type(&self) -> AccountType {
        self.account_type
    }

    /// Build a request for `resource` under the account's path prefix.
    ///
    /// The request id is fixed here, so a resent request keeps it.
    pub fn request(&self, method: Method, resource: &str) -> PendingRequest {
        let path = format!("{}/{}", self.prefix, resource.trim_start_matches('/'));
        PendingRequest::new(method, path).header(REQUEST_ID_HEADER, Uuid::new_v4().to_string())
    }

    /// Send an arbitrary request with the key pair.
    pub async fn execute(&self, request: &PendingRequest) -> Result<ApiResponse> {
        self.executor.execute(request).await
    }

    async fn call(&self, request: PendingRequest) -> Result<Value> {
        debug!(
            method = %request.method(),
            path = request.path(),
            request_id = request_id(&request),
            "eToro call"
        );
        let value: Value = self.executor.execute_json(&request).await?;
        // Some endpoints answer 2xx with an empty body.
        if value.is_null() {
            return Ok(json!({"success": true}));
        }
        Ok(value)
    }

    /// Check the key pair with a lightweight call.
    ///
    /// Returns `Ok(false)` if eToro rejects the keys; other failures are
    /// returned as errors.
    #[instrument(skip(self))]
    pub async fn validate_credentials(&self) -> Result<bool> {
        match self.account_info().await {
            Ok(_) => {
                info!("eToro credentials accepted");
                Ok(true)
            }
            Err(Error::Auth(AuthError::SessionRejected { status })) => {
                warn!(status, "eToro credentials rejected");
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }

    // ------------------------------------------------------------------
    // Account
    // ------------------------------------------------------------------

    /// Balance, equity and margin.
    pub async fn account_info(&self) -> Result<Value> {
        self.call(self.request(Method::GET, "account/info")).await
    }

    pub async fn portfolio_summary(&self) -> Result<Value> {
        self.call(self.request(Method::GET, "portfolio/summary"))
            .await
    }

    // ------------------------------------------------------------------
    // Market data
    // ------------------------------------------------------------------

    pub async fn search_instruments(&self, search: &InstrumentSearch) -> Result<Value> {
        let request = self
            .request(Method::GET, "instruments/search")
            .query_opt("q", search.query.as_deref().filter(|q| !q.is_empty()))
            .query_opt(
                "category",
                search.category.as_deref().filter(|c| !c.is_empty()),
            )
            .query_opt("limit", (search.limit > 0).then_some(search.limit));
        self.call(request).await
    }

    /// Spread, trading hours and order limits of one instrument.
    pub async fn instrument_metadata(&self, instrument_id: u64) -> Result<Value> {
        require_instrument(instrument_id)?;
        self.call(self.request(
            Method::GET,
            &format!("instruments/{}/metadata", instrument_id),
        ))
        .await
    }

    /// Current bid and ask for one or more instruments.
    pub async fn current_rates(&self, instrument_ids: &[u64]) -> Result<Value> {
        if instrument_ids.is_empty() {
            return Err(InvalidInputError::parameter(
                "instrumentIds",
                "must list at least one instrument",
            )
            .into());
        }
        for id in instrument_ids {
            require_instrument(*id)?;
        }
        let ids = instrument_ids
            .iter()
            .map(u64::to_string)
            .collect::<Vec<_>>()
            .join(",");
        self.call(self.request(Method::GET, "rates/current").query("instrumentIds", ids))
            .await
    }

    // ------------------------------------------------------------------
    // Positions
    // ------------------------------------------------------------------

    pub async fn positions(&self) -> Result<Value> {
        self.call(self.request(Method::GET, "positions")).await
    }

    #[instrument(skip(self, order), fields(instrument_id = order.instrument_id, direction = %order.direction))]
    pub async fn open_position(&self, order: &OpenPosition) -> Result<Value> {
        order.validate()?;
        let result = self
            .call(self.request(Method::POST, "positions").json(order)?)
            .await?;
        info!("Position opened");
        Ok(result)
    }

    #[instrument(skip(self))]
    pub async fn close_position(&self, position_id: &str) -> Result<Value> {
        require_position(position_id)?;
        let result = self
            .call(self.request(Method::DELETE, &format!("positions/{}", position_id)))
            .await?;
        info!("Position closed");
        Ok(result)
    }

    /// Move the stop loss and/or take profit of an open position.
    #[instrument(skip(self, amendment))]
    pub async fn amend_position(&self, position_id: &str, amendment: &AmendPosition) -> Result<Value> {
        require_position(position_id)?;
        amendment.validate()?;
        self.call(
            self.request(Method::PUT, &format!("positions/{}", position_id))
                .json(amendment)?,
        )
        .await
    }
}

fn request_id(request: &PendingRequest) -> &str {
    request
        .extra_headers()
        .iter()
        .find(|(name, _)| name == REQUEST_ID_HEADER)
        .map(|(_, value)| value.as_str())
        .unwrap_or_default()
}

impl fmt::Debug for EtoroClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EtoroClient")
            .field("base_url", self.executor.base_url())
            .field("account_type", &self.account_type)
            .finish()
    }
}
