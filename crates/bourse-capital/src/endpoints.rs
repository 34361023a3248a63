//! Capital.com endpoint paths and login wire types.

use serde::{Deserialize, Serialize};

// ============================================================================
// Endpoint Paths
// ============================================================================

pub const SESSION: &str = "/api/v1/session";
pub const ACCOUNTS: &str = "/api/v1/accounts";
pub const ACCOUNT_PREFERENCES: &str = "/api/v1/accounts/preferences";
pub const MARKETS: &str = "/api/v1/markets";
pub const PRICES: &str = "/api/v1/prices";
pub const POSITIONS: &str = "/api/v1/positions";
pub const WORKING_ORDERS: &str = "/api/v1/workingorders";
pub const CONFIRMS: &str = "/api/v1/confirms";
pub const WATCHLISTS: &str = "/api/v1/watchlists";
pub const TIME: &str = "/api/v1/time";
pub const PING: &str = "/api/v1/ping";

// ============================================================================
// Header Names
// ============================================================================

pub const API_KEY_HEADER: &str = "X-CAP-API-KEY";
pub const CST_HEADER: &str = "CST";
pub const SECURITY_TOKEN_HEADER: &str = "X-SECURITY-TOKEN";

/// Error codes Capital.com returns for an expired or missing session.
pub const SESSION_ERROR_CODES: &[&str] = &[
    "error.invalid.session.token",
    "error.null.client.token",
];

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for `POST /session`.
#[derive(Serialize)]
pub(crate) struct CreateSessionRequest<'a> {
    pub identifier: &'a str,
    pub password: &'a str,
}

/// Response from `GET /accounts`.
#[derive(Debug, Deserialize)]
pub(crate) struct AccountsResponse {
    #[serde(default)]
    pub accounts: Vec<AccountSummary>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AccountSummary {
    pub account_id: String,
    #[serde(default)]
    pub preferred: bool,
}

/// Request body for `PUT /session`.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SwitchAccountRequest<'a> {
    pub account_id: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accounts_response_tolerates_missing_flags() {
        let parsed: AccountsResponse = serde_json::from_str(
            r#"{"accounts":[{"accountId":"A1","accountName":"CFD"},{"accountId":"A2","preferred":true}]}"#,
        )
        .unwrap();
        assert_eq!(parsed.accounts.len(), 2);
        assert!(!parsed.accounts[0].preferred);
        assert!(parsed.accounts[1].preferred);
    }

    #[test]
    fn create_session_body_shape() {
        let body = serde_json::to_value(CreateSessionRequest {
            identifier: "trader@example.com",
            password: "hunter2",
        })
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({"identifier": "trader@example.com", "password": "hunter2"})
        );
    }
}
