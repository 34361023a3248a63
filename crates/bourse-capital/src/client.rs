//! Capital.com REST client.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, instrument};

use bourse_core::error::InvalidInputError;
use bourse_core::{
    ApiResponse, Credentials, HttpTransport, PendingRequest, RenewingSession, RequestExecutor,
    Result, SessionManager, SessionState, Transport,
};

use crate::auth::{CapitalAuthenticator, auth_failure_rule};
use crate::config::CapitalConfig;
use crate::endpoints::{self, SwitchAccountRequest};
use crate::markets::PriceQuery;
use crate::orders::{
    AmendPosition, AmendWorkingOrder, OpenPosition, WorkingOrder, require_id, require_text,
};

type CapitalExecutor = RequestExecutor<RenewingSession<CapitalAuthenticator>, Arc<dyn Transport>>;

/// A Capital.com client.
///
/// Clones share one session: however many tasks use the client, at most one
/// login is in flight, and an expired session is renewed once for all of
/// them. Endpoint methods return the API's JSON unchanged.
///
/// # Example
///
/// ```no_run
/// use bourse_capital::{CapitalClient, CapitalConfig};
///
/// # async fn example() -> bourse_core::Result<()> {
/// let client = CapitalClient::new(CapitalConfig::from_env()?)?;
/// let positions = client.positions().await?;
/// println!("{}", positions);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct CapitalClient {
    executor: Arc<CapitalExecutor>,
}

impl CapitalClient {
    /// Create a client over the default HTTP transport. No request is sent
    /// until the first call.
    pub fn new(config: CapitalConfig) -> Result<Self> {
        Self::with_transport(config, Arc::new(HttpTransport::new()?))
    }

    pub fn with_transport(config: CapitalConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        let base_url = config.base_url()?;
        let authenticator = CapitalAuthenticator::new(config, transport.clone())?;
        let executor = RequestExecutor::new(
            base_url,
            RenewingSession::new(authenticator),
            transport,
            auth_failure_rule(),
        );
        Ok(Self {
            executor: Arc::new(executor),
        })
    }

    pub fn session(&self) -> &RenewingSession<CapitalAuthenticator> {
        self.executor.session()
    }

    pub async fn state(&self) -> SessionState {
        self.session().state().await
    }

    /// Log in now instead of on the first request.
    pub async fn login(&self) -> Result<Credentials> {
        self.session().ensure_authenticated().await
    }

    /// Discard the current session and log in again.
    pub async fn relogin(&self) -> Result<Credentials> {
        self.session().force_refresh().await
    }

    /// The account selected at login.
    pub async fn account_id(&self) -> Result<Option<String>> {
        let credentials = self.login().await?;
        Ok(credentials.account().map(str::to_string))
    }

    /// Send an arbitrary request through the session.
    pub async fn execute(&self, request: &PendingRequest) -> Result<ApiResponse> {
        self.executor.execute(request).await
    }

    async fn call(&self, request: PendingRequest) -> Result<Value> {
        debug!(method = %request.method(), path = request.path(), "Capital.com call");
        self.executor.execute_json(&request).await
    }

    // ------------------------------------------------------------------
    // Session and accounts
    // ------------------------------------------------------------------

    pub async fn session_details(&self) -> Result<Value> {
        self.call(PendingRequest::get(endpoints::SESSION)).await
    }

    /// Switch the active financial account of the current session.
    ///
    /// A later re-login selects the configured account again.
    #[instrument(skip(self))]
    pub async fn switch_account(&self, account_id: &str) -> Result<Value> {
        require_text("accountId", account_id)?;
        let request =
            PendingRequest::put(endpoints::SESSION).json(&SwitchAccountRequest { account_id })?;
        self.call(request).await
    }

    pub async fn accounts(&self) -> Result<Value> {
        self.call(PendingRequest::get(endpoints::ACCOUNTS)).await
    }

    pub async fn account_preferences(&self) -> Result<Value> {
        self.call(PendingRequest::get(endpoints::ACCOUNT_PREFERENCES))
            .await
    }

    // ------------------------------------------------------------------
    // Markets
    // ------------------------------------------------------------------

    pub async fn search_markets(&self, search_term: &str) -> Result<Value> {
        require_text("searchTerm", search_term)?;
        self.call(PendingRequest::get(endpoints::MARKETS).query("searchTerm", search_term))
            .await
    }

    /// Details for up to 50 epics in one call.
    pub async fn markets(&self, epics: &[&str]) -> Result<Value> {
        if epics.is_empty() || epics.iter().any(|e| e.trim().is_empty()) {
            return Err(InvalidInputError::parameter("epics", "must list at least one epic").into());
        }
        self.call(PendingRequest::get(endpoints::MARKETS).query("epics", epics.join(",")))
            .await
    }

    pub async fn market(&self, epic: &str) -> Result<Value> {
        require_id("epic", epic)?;
        self.call(PendingRequest::get(format!("{}/{}", endpoints::MARKETS, epic)))
            .await
    }

    pub async fn prices(&self, epic: &str, query: &PriceQuery) -> Result<Value> {
        require_id("epic", epic)?;
        let request = query.apply(PendingRequest::get(format!("{}/{}", endpoints::PRICES, epic)));
        self.call(request).await
    }

    // ------------------------------------------------------------------
    // Positions
    // ------------------------------------------------------------------

    pub async fn positions(&self) -> Result<Value> {
        self.call(PendingRequest::get(endpoints::POSITIONS)).await
    }

    pub async fn position(&self, deal_id: &str) -> Result<Value> {
        require_id("dealId", deal_id)?;
        self.call(PendingRequest::get(position_path(deal_id))).await
    }

    /// Open a position. The response carries a `dealReference` to pass to
    /// [`confirm`](Self::confirm).
    #[instrument(skip(self, order), fields(epic = %order.epic, direction = %order.direction))]
    pub async fn open_position(&self, order: &OpenPosition) -> Result<Value> {
        order.validate()?;
        self.call(PendingRequest::post(endpoints::POSITIONS).json(order)?)
            .await
    }

    #[instrument(skip(self, amendment))]
    pub async fn amend_position(&self, deal_id: &str, amendment: &AmendPosition) -> Result<Value> {
        require_id("dealId", deal_id)?;
        amendment.validate()?;
        self.call(PendingRequest::put(position_path(deal_id)).json(amendment)?)
            .await
    }

    #[instrument(skip(self))]
    pub async fn close_position(&self, deal_id: &str) -> Result<Value> {
        require_id("dealId", deal_id)?;
        self.call(PendingRequest::delete(position_path(deal_id)))
            .await
    }

    // ------------------------------------------------------------------
    // Working orders
    // ------------------------------------------------------------------

    pub async fn working_orders(&self) -> Result<Value> {
        self.call(PendingRequest::get(endpoints::WORKING_ORDERS))
            .await
    }

    /// Place a limit or stop order.
    ///
    /// The returned `dealReference` is not the working order id; list the
    /// working orders to find the id for amendments.
    #[instrument(skip(self, order), fields(epic = %order.epic, direction = %order.direction))]
    pub async fn create_working_order(&self, order: &WorkingOrder) -> Result<Value> {
        order.validate()?;
        self.call(PendingRequest::post(endpoints::WORKING_ORDERS).json(order)?)
            .await
    }

    #[instrument(skip(self, amendment))]
    pub async fn amend_working_order(
        &self,
        order_id: &str,
        amendment: &AmendWorkingOrder,
    ) -> Result<Value> {
        require_id("workingOrderId", order_id)?;
        amendment.validate()?;
        self.call(PendingRequest::put(working_order_path(order_id)).json(amendment)?)
            .await
    }

    #[instrument(skip(self))]
    pub async fn delete_working_order(&self, order_id: &str) -> Result<Value> {
        require_id("workingOrderId", order_id)?;
        self.call(PendingRequest::delete(working_order_path(order_id)))
            .await
    }

    // ------------------------------------------------------------------
    // Deals, watchlists and utilities
    // ------------------------------------------------------------------

    /// Status of a deal by the `dealReference` returned when it was placed.
    pub async fn confirm(&self, deal_reference: &str) -> Result<Value> {
        require_id("dealReference", deal_reference)?;
        self.call(PendingRequest::get(format!(
            "{}/{}",
            endpoints::CONFIRMS,
            deal_reference
        )))
        .await
    }

    pub async fn watchlists(&self) -> Result<Value> {
        self.call(PendingRequest::get(endpoints::WATCHLISTS)).await
    }

    pub async fn watchlist(&self, watchlist_id: &str) -> Result<Value> {
        require_id("watchlistId", watchlist_id)?;
        self.call(PendingRequest::get(format!(
            "{}/{}",
            endpoints::WATCHLISTS,
            watchlist_id
        )))
        .await
    }

    pub async fn server_time(&self) -> Result<Value> {
        self.call(PendingRequest::get(endpoints::TIME)).await
    }

    pub async fn ping(&self) -> Result<Value> {
        self.call(PendingRequest::get(endpoints::PING)).await
    }
}

fn position_path(deal_id: &str) -> String {
    format!("{}/{}", endpoints::POSITIONS, deal_id)
}

fn working_order_path(order_id: &str) -> String {
    format!("{}/{}", endpoints::WORKING_ORDERS, order_id)
}

impl fmt::Debug for CapitalClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapitalClient")
            .field("base_url", self.executor.base_url())
            .field("session", self.executor.session())
            .finish()
    }
}
