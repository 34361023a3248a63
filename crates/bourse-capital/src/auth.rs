//! Capital.com login.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, instrument, warn};

use bourse_core::error::AuthError;
use bourse_core::{
    ApiResponse, AuthFailureRule, Authenticator, BaseUrl, Credentials, Error, PendingRequest,
    Result, StatusCode, Transport,
};

use crate::config::CapitalConfig;
use crate::endpoints::{
    self, API_KEY_HEADER, AccountsResponse, CST_HEADER, CreateSessionRequest,
    SECURITY_TOKEN_HEADER, SESSION_ERROR_CODES,
};

/// The response markers Capital.com uses for an expired session.
pub fn auth_failure_rule() -> AuthFailureRule {
    SESSION_ERROR_CODES.iter().fold(
        AuthFailureRule::unauthorized().with_error_field("errorCode"),
        |rule, code| rule.with_error_code(*code),
    )
}

/// Logs in with identifier and password.
///
/// A login is two calls: `POST /session` yields the `CST` and
/// `X-SECURITY-TOKEN` tokens in response headers, then `GET /accounts`
/// with those tokens picks the account the credentials are bound to.
pub struct CapitalAuthenticator {
    config: CapitalConfig,
    base_url: BaseUrl,
    transport: Arc<dyn Transport>,
}

impl CapitalAuthenticator {
    pub fn new(config: CapitalConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        Ok(Self {
            base_url: config.base_url()?,
            config,
            transport,
        })
    }

    pub fn config(&self) -> &CapitalConfig {
        &self.config
    }

    async fn create_session(&self) -> Result<Credentials> {
        let request = PendingRequest::post(endpoints::SESSION)
            .header(API_KEY_HEADER, self.config.api_key().expose())
            .json(&CreateSessionRequest {
                identifier: self.config.identifier(),
                password: self.config.password().expose(),
            })?;

        let response = self.send(&request, &Credentials::new()).await?;
        if !response.is_success() {
            return Err(login_error(&response));
        }

        let cst = token_header(&response, CST_HEADER)?;
        let security_token = token_header(&response, SECURITY_TOKEN_HEADER)?;
        Ok(Credentials::new()
            .with_entry(API_KEY_HEADER, self.config.api_key().clone())
            .with_entry(CST_HEADER, cst)
            .with_entry(SECURITY_TOKEN_HEADER, security_token))
    }

    async fn select_account(&self, credentials: &Credentials) -> Result<String> {
        let response = self
            .send(&PendingRequest::get(endpoints::ACCOUNTS), credentials)
            .await?;
        if !response.is_success() {
            return Err(response.to_remote_error().into());
        }

        let accounts = response.json::<AccountsResponse>()?.accounts;
        debug!(count = accounts.len(), "Accounts available");

        let wanted = self.config.preferred_account();
        let selected = wanted
            .and_then(|id| accounts.iter().find(|a| a.account_id == id))
            .or_else(|| accounts.iter().find(|a| a.preferred))
            .or_else(|| accounts.first())
            .ok_or(AuthError::NoAccounts)?;

        if let Some(id) = wanted.filter(|id| *id != selected.account_id) {
            warn!(requested = id, "Requested account not found, using default");
        }
        Ok(selected.account_id.clone())
    }

    async fn send(&self, request: &PendingRequest, credentials: &Credentials) -> Result<ApiResponse> {
        let http = request.to_http(&self.base_url, credentials)?;
        self.transport.send(http).await
    }
}

#[async_trait]
impl Authenticator for CapitalAuthenticator {
    #[instrument(skip(self), fields(identifier = self.config.identifier()))]
    async fn login(&self) -> Result<Credentials> {
        let credentials = self.create_session().await?;
        let account = self.select_account(&credentials).await?;
        info!(account = %account, "Capital.com session created");
        Ok(credentials.with_account(account))
    }
}

impl fmt::Debug for CapitalAuthenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapitalAuthenticator")
            .field("config", &self.config)
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// 400, 401 and 403 from the session endpoint mean the login material is
/// wrong; anything else is an ordinary API error.
fn login_error(response: &ApiResponse) -> Error {
    let remote = response.to_remote_error();
    match response.status() {
        StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            AuthError::InvalidCredentials {
                status: remote.status,
                message: remote.message.or(remote.code),
            }
            .into()
        }
        _ => remote.into(),
    }
}

fn token_header(response: &ApiResponse, name: &str) -> Result<String> {
    response
        .header(name)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| {
            AuthError::MalformedLogin {
                message: format!("missing {} header", name),
            }
            .into()
        })
}
