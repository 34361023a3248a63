//! eToro client configuration.

use std::fmt;

use tracing::warn;

use bourse_core::error::InvalidInputError;
use bourse_core::{AccountType, BaseUrl, Result, Secret};

pub const DEFAULT_BASE_URL: &str = "https://api.etoro.com";

/// Environment variable names read by [`EtoroConfig::from_env`].
pub mod env {
    pub const BASE_URL: &str = "ETORO_BASE_URL";
    pub const API_KEY: &str = "ETORO_API_KEY";
    pub const USER_KEY: &str = "ETORO_USER_KEY";
    pub const ACCOUNT_TYPE: &str = "ETORO_ACCOUNT_TYPE";
}

/// Key pair and endpoint selection for an eToro client.
#[derive(Clone)]
pub struct EtoroConfig {
    api_key: Secret,
    user_key: Secret,
    account_type: AccountType,
    base_url: Option<BaseUrl>,
}

impl EtoroConfig {
    pub fn new(api_key: impl Into<Secret>, user_key: impl Into<Secret>) -> Self {
        Self {
            api_key: api_key.into(),
            user_key: user_key.into(),
            account_type: AccountType::Demo,
            base_url: None,
        }
    }

    /// Read configuration from `ETORO_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// An unrecognized account type falls back to demo with a warning, so a
    /// typo never sends orders to a real-money account.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let require = |name: &str| {
            get(name).ok_or_else(|| InvalidInputError::MissingConfig {
                name: name.to_string(),
            })
        };

        let mut config = Self::new(require(env::API_KEY)?, require(env::USER_KEY)?);
        if let Some(account_type) = get(env::ACCOUNT_TYPE) {
            config = config.with_account_type(parse_account_type(&account_type));
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

    pub fn with_base_url(mut self, base_url: BaseUrl) -> Self {
        self.base_url = Some(base_url);
        self
    }

    pub fn api_key(&self) -> &Secret {
        &self.api_key
    }

    pub fn user_key(&self) -> &Secret {
        &self.user_key
    }

    pub fn account_type(&self) -> AccountType {
        self.account_type
    }

    pub fn base_url(&self) -> Result<BaseUrl> {
        match &self.base_url {
            Some(base_url) => Ok(base_url.clone()),
            None => BaseUrl::new(DEFAULT_BASE_URL),
        }
    }

    /// Path prefix that selects the demo or real-money API.
    pub fn path_prefix(&self) -> &'static str {
        if self.account_type.is_demo() {
            "/api/demo/v1"
        } else {
            "/api/v1"
        }
    }
}

/// eToro names its account types `demo` and `real`.
pub fn parse_account_type(value: &str) -> AccountType {
    match value.trim().to_ascii_lowercase().as_str() {
        "demo" => AccountType::Demo,
        "real" => AccountType::Live,
        other => {
            warn!(account_type = other, "Unknown account type, using demo");
            AccountType::Demo
        }
    }
}

impl fmt::Debug for EtoroConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EtoroConfig")
            .field("account_type", &self.account_type)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}
