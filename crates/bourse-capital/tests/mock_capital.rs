//! Mock Capital.com tests.
//!
//! These tests use wiremock to simulate the Capital.com REST API and check
//! login, session renewal and request replay without network access.

use std::sync::Arc;
use std::time::Duration;

use bourse_capital::{
    AmendPosition, CapitalClient, CapitalConfig, OpenPosition, PriceQuery, Protection, Resolution,
};
use bourse_core::error::AuthError;
use bourse_core::{BaseUrl, Direction, Error, SessionState};
use serde_json::{Value, json};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

const API_KEY: &str = "test-api-key";
const IDENTIFIER: &str = "trader@example.com";
const PASSWORD: &str = "hunter2";

fn client(server: &MockServer) -> CapitalClient {
    let config = CapitalConfig::new(API_KEY, IDENTIFIER, PASSWORD)
        .with_base_url(BaseUrl::new(server.uri()).unwrap());
    CapitalClient::new(config).unwrap()
}

fn session_created(cst: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("CST", cst)
        .insert_header("X-SECURITY-TOKEN", format!("sec-{}", cst))
        .set_body_json(json!({"accountType": "CFD", "currencyIsoCode": "USD"}))
}

fn session_expired() -> ResponseTemplate {
    ResponseTemplate::new(401).set_body_json(json!({"errorCode": "error.invalid.session.token"}))
}

async fn mount_login(server: &MockServer, cst: &str) {
    Mock::given(method("POST"))
        .and(path("/api/v1/session"))
        .respond_with(session_created(cst))
        .mount(server)
        .await;
}

async fn mount_accounts(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/v1/accounts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accounts": [
                {"accountId": "ACC-1", "accountName": "Primary", "preferred": false},
                {"accountId": "ACC-2", "accountName": "Hedging", "preferred": true}
            ]
        })))
        .mount(server)
        .await;
}

fn requests_to<'a>(requests: &'a [Request], verb: &str, route: &str) -> Vec<&'a Request> {
    requests
        .iter()
        .filter(|r| r.method.as_str() == verb && r.url.path() == route)
        .collect()
}

// ============================================================================
// Login
// ============================================================================

#[tokio::test]
async fn test_login_success() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/session"))
        .and(header("X-CAP-API-KEY", API_KEY))
        .and(body_json(json!({
            "identifier": IDENTIFIER,
            "password": PASSWORD
        })))
        .respond_with(session_created("cst-1"))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/accounts"))
        .and(header("CST", "cst-1"))
        .and(header("X-SECURITY-TOKEN", "sec-cst-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accounts": [
                {"accountId": "ACC-1", "preferred": false},
                {"accountId": "ACC-2", "preferred": true}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    assert_eq!(client.state().await, SessionState::NotAuthenticated);

    let credentials = client.login().await.unwrap();
    assert_eq!(credentials.account(), Some("ACC-2"));
    assert_eq!(credentials.get("cst").unwrap().expose(), "cst-1");
    assert!(client.state().await.is_authenticated());

    // Already authenticated: no second login.
    client.login().await.unwrap();
}

#[tokio::test]
async fn test_configured_account_is_selected() {
    let server = MockServer::start().await;
    mount_login(&server, "cst-1").await;
    mount_accounts(&server).await;

    let config = CapitalConfig::new(API_KEY, IDENTIFIER, PASSWORD)
        .with_base_url(BaseUrl::new(server.uri()).unwrap())
        .with_preferred_account("ACC-1");
    let client = CapitalClient::new(config).unwrap();

    assert_eq!(client.account_id().await.unwrap().as_deref(), Some("ACC-1"));
}

#[tokio::test]
async fn test_login_invalid_credentials() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/session"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "errorCode": "error.invalid.details"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/positions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"positions": []})))
        .expect(0)
        .mount(&server)
        .await;

    let client = client(&server);
    let err = client.positions().await.unwrap_err();

    match err {
        Error::Auth(AuthError::InvalidCredentials { status, message }) => {
            assert_eq!(status, 401);
            assert_eq!(message.as_deref(), Some("error.invalid.details"));
        }
        other => panic!("expected invalid credentials, got {:?}", other),
    }
    assert_eq!(client.state().await, SessionState::NotAuthenticated);
}

#[tokio::test]
async fn test_login_without_tokens_is_malformed() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/session"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let err = client(&server).login().await.unwrap_err();
    assert!(matches!(err, Error::Auth(AuthError::MalformedLogin { .. })));
}

#[tokio::test]
async fn test_login_without_accounts() {
    let server = MockServer::start().await;
    mount_login(&server, "cst-1").await;

    Mock::given(method("GET"))
        .and(path("/api/v1/accounts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"accounts": []})))
        .mount(&server)
        .await;

    let err = client(&server).login().await.unwrap_err();
    assert!(matches!(err, Error::Auth(AuthError::NoAccounts)));
}

// ============================================================================
// Session renewal
// ============================================================================

#[tokio::test]
async fn test_expired_session_is_renewed_and_request_retried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/session"))
        .respond_with(session_created("cst-1"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/session"))
        .respond_with(session_created("cst-2"))
        .expect(1)
        .mount(&server)
        .await;
    mount_accounts(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/v1/positions"))
        .and(header("CST", "cst-1"))
        .respond_with(session_expired())
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/positions"))
        .and(header("CST", "cst-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "positions": [{"position": {"dealId": "DEAL-1"}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    let positions = client.positions().await.unwrap();

    assert_eq!(positions["positions"][0]["position"]["dealId"], "DEAL-1");
    assert!(matches!(
        client.state().await,
        SessionState::Authenticated { generation: 2, .. }
    ));
}

#[tokio::test]
async fn test_session_error_code_triggers_renewal() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/session"))
        .respond_with(session_created("cst-1"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/session"))
        .respond_with(session_created("cst-2"))
        .mount(&server)
        .await;
    mount_accounts(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/v1/watchlists"))
        .and(header("CST", "cst-1"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({"errorCode": "error.null.client.token"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/watchlists"))
        .and(header("CST", "cst-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"watchlists": []})))
        .expect(1)
        .mount(&server)
        .await;

    let watchlists = client(&server).watchlists().await.unwrap();
    assert_eq!(watchlists, json!({"watchlists": []}));
}

#[tokio::test]
async fn test_persistent_rejection_surfaces_after_one_retry() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/session"))
        .respond_with(session_created("cst-1"))
        .expect(2)
        .mount(&server)
        .await;
    mount_accounts(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/v1/positions"))
        .respond_with(session_expired())
        .expect(2)
        .mount(&server)
        .await;

    let err = client(&server).positions().await.unwrap_err();
    assert!(matches!(
        err,
        Error::Auth(AuthError::SessionRejected { status: 401 })
    ));
}

#[tokio::test]
async fn test_retried_order_body_is_identical() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/session"))
        .respond_with(session_created("cst-1"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/session"))
        .respond_with(session_created("cst-2"))
        .mount(&server)
        .await;
    mount_accounts(&server).await;

    Mock::given(method("POST"))
        .and(path("/api/v1/positions"))
        .and(header("CST", "cst-1"))
        .respond_with(session_expired())
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/positions"))
        .and(header("CST", "cst-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"dealReference": "o_123"})))
        .mount(&server)
        .await;

    let order = OpenPosition::new("SILVER", Direction::Buy, 2.0).with_protection(Protection {
        trailing_stop: Some(true),
        stop_distance: Some(0.5),
        ..Default::default()
    });
    let result = client(&server).open_position(&order).await.unwrap();
    assert_eq!(result["dealReference"], "o_123");

    let requests = server.received_requests().await.unwrap();
    let orders = requests_to(&requests, "POST", "/api/v1/positions");
    assert_eq!(orders.len(), 2);
    assert_eq!(orders[0].body, orders[1].body);
    assert_eq!(
        serde_json::from_slice::<Value>(&orders[0].body).unwrap(),
        json!({
            "epic": "SILVER",
            "direction": "BUY",
            "size": 2.0,
            "trailingStop": true,
            "stopDistance": 0.5
        })
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_callers_share_one_login() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/session"))
        .respond_with(session_created("cst-1").set_delay(Duration::from_millis(100)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/accounts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accounts": [{"accountId": "ACC-1"}]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/ping"))
        .and(header("CST", "cst-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "OK"})))
        .expect(5)
        .mount(&server)
        .await;

    let client = Arc::new(client(&server));
    let handles: Vec<_> = (0..5)
        .map(|_| {
            let client = client.clone();
            tokio::spawn(async move { client.ping().await })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap()["status"], "OK");
    }
    assert_eq!(client.session().completed_logins(), 1);
}

// ============================================================================
// Endpoints and errors
// ============================================================================

#[tokio::test]
async fn test_remote_error_is_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/session"))
        .respond_with(session_created("cst-1"))
        .expect(1)
        .mount(&server)
        .await;
    mount_accounts(&server).await;

    Mock::given(method("DELETE"))
        .and(path("/api/v1/positions/DEAL-404"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "errorCode": "error.not-found.dealId"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = client(&server).close_position("DEAL-404").await.unwrap_err();
    let remote = err.as_remote().expect("remote error");
    assert_eq!(remote.status, 404);
    assert_eq!(remote.code.as_deref(), Some("error.not-found.dealId"));
}

#[tokio::test]
async fn test_prices_query_parameters() {
    let server = MockServer::start().await;
    mount_login(&server, "cst-1").await;
    mount_accounts(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/v1/prices/GOLD"))
        .and(query_param("resolution", "HOUR_4"))
        .and(query_param("max", "25"))
        .and(query_param("from", "2026-10-01T00:00:00"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"prices": []})))
        .expect(1)
        .mount(&server)
        .await;

    let query = PriceQuery {
        resolution: Resolution::Hour4,
        max: 25,
        from: Some("2026-10-01T00:00:00".to_string()),
        to: None,
    };
    let prices = client(&server).prices("GOLD", &query).await.unwrap();
    assert_eq!(prices, json!({"prices": []}));
}

#[tokio::test]
async fn test_ids_cannot_escape_their_resource() {
    let server = MockServer::start().await;
    let client = client(&server);

    for id in ["../workingorders/DEAL9", "DEAL1?force=true", "DEAL1#x", ".."] {
        let err = client.close_position(id).await.unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)), "{}: {}", id, err);
    }
    assert!(matches!(
        client.delete_working_order("../positions/DEAL1").await,
        Err(Error::InvalidInput(_))
    ));
    assert!(matches!(
        client.market("GOLD/../../session").await,
        Err(Error::InvalidInput(_))
    ));

    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_invalid_amendment_is_rejected_before_login() {
    let server = MockServer::start().await;

    let client = client(&server);
    let err = client
        .amend_position("DEAL-1", &AmendPosition::default())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::InvalidInput(_)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_invalid_protection_is_rejected_before_login() {
    let server = MockServer::start().await;

    let order = OpenPosition::new("SILVER", Direction::Sell, 1.0).with_protection(Protection {
        guaranteed_stop: Some(true),
        trailing_stop: Some(true),
        stop_distance: Some(1.0),
        ..Default::default()
    });
    let err = client(&server).open_position(&order).await.unwrap_err();

    assert!(matches!(err, Error::InvalidInput(_)));
    assert!(server.received_requests().await.unwrap().is_empty());
}
