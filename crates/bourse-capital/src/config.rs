//! Capital.com client configuration.

use std::fmt;

use bourse_core::error::InvalidInputError;
use bourse_core::{AccountType, BaseUrl, Result, Secret};

/// Demo (paper trading) API host.
pub const DEMO_BASE_URL: &str = "https://demo-api-capital.backend-capital.com";

/// Live API host.
pub const LIVE_BASE_URL: &str = "https://api-capital.backend-capital.com";

/// Environment variable names read by [`CapitalConfig::from_env`].
pub mod env {
    pub const BASE_URL: &str = "CAPITAL_BASE_URL";
    pub const API_KEY: &str = "CAPITAL_API_KEY";
    pub const IDENTIFIER: &str = "CAPITAL_IDENTIFIER";
    pub const PASSWORD: &str = "CAPITAL_PASSWORD";
    pub const ACCOUNT_TYPE: &str = "CAPITAL_ACCOUNT_TYPE";
}

/// Login material and endpoint selection for a Capital.com client.
///
/// The base URL defaults to the demo or live host for the account type
/// unless overridden with [`with_base_url`](Self::with_base_url).
#[derive(Clone)]
pub struct CapitalConfig {
    api_key: Secret,
    identifier: String,
    password: Secret,
    account_type: AccountType,
    base_url: Option<BaseUrl>,
    preferred_account: Option<String>,
}

impl CapitalConfig {
    pub fn new(
        api_key: impl Into<Secret>,
        identifier: impl Into<String>,
        password: impl Into<Secret>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            identifier: identifier.into(),
            password: password.into(),
            account_type: AccountType::Demo,
            base_url: None,
            preferred_account: None,
        }
    }

    /// Read configuration from `CAPITAL_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidInputError::MissingConfig`] if a required variable is
    /// unset or empty, or a validation error for a malformed base URL or
    /// account type.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let require = |name: &str| {
            get(name).ok_or_else(|| InvalidInputError::MissingConfig {
                name: name.to_string(),
            })
        };

        let mut config = Self::new(
            require(env::API_KEY)?,
            require(env::IDENTIFIER)?,
            require(env::PASSWORD)?,
        );
        if let Some(account_type) = get(env::ACCOUNT_TYPE) {
            config = config.with_account_type(account_type.parse()?);
        }
        if let Some(base_url) = get(env::BASE_URL) {
            config = config.with_base_url(BaseUrl::new(base_url)?);
        }
        Ok(config)
    }

    pub fn with_account_type(mut self, account_type: AccountType) -> Self {
        self.account_type = account_type;
        self
    }

    /// Override the API host, e.g. for a proxy or a mock server.
    pub fn with_base_url(mut self, base_url: BaseUrl) -> Self {
        self.base_url = Some(base_url);
        self
    }

    /// Select this account after login instead of the one Capital.com
    /// marks as preferred.
    pub fn with_preferred_account(mut self, account_id: impl Into<String>) -> Self {
        self.preferred_account = Some(account_id.into());
        self
    }

    pub fn api_key(&self) -> &Secret {
        &self.api_key
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn password(&self) -> &Secret {
        &self.password
    }

    pub fn account_type(&self) -> AccountType {
        self.account_type
    }

    pub fn preferred_account(&self) -> Option<&str> {
        self.preferred_account.as_deref()
    }

    /// The effective base URL.
    pub fn base_url(&self) -> Result<BaseUrl> {
        match &self.base_url {
            Some(base_url) => Ok(base_url.clone()),
            None if self.account_type.is_demo() => BaseUrl::new(DEMO_BASE_URL),
            None => BaseUrl::new(LIVE_BASE_URL),
        }
    }
}

impl fmt::Debug for CapitalConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapitalConfig")
            .field("identifier", &self.identifier)
            .field("account_type", &self.account_type)
            .field("base_url", &self.base_url)
            .field("preferred_account", &self.preferred_account)
            .finish_non_exhaustive()
    }
}
