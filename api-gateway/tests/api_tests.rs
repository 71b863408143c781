use std::sync::Arc;
use std::time::Duration;

use api_gateway::{create_router, AppState};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::NaiveDate;
use common::{NativeError, Record};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use terminal_connector::{InMemoryConnector, SessionManager};
use tokio::sync::Notify;
use tower::ServiceExt;

fn make_app(connector: InMemoryConnector) -> Router {
    let state = AppState::new(SessionManager::new(connector), "Finance MCP API");
    create_router(Arc::new(state))
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn account_body() -> Value {
    json!({
        "login": 10008011380u64,
        "password": "secret",
        "server": "MetaQuotes-Demo"
    })
}

fn history_body(from: &str, to: &str) -> Value {
    json!({
        "login": 10008011380u64,
        "password": "secret",
        "server": "MetaQuotes-Demo",
        "from_date": from,
        "to_date": to
    })
}

#[tokio::test]
async fn test_health_check() {
    let connector = InMemoryConnector::new();
    let request = Request::builder()
        .uri("/api/v1/health")
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(make_app(connector.clone()), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "Finance MCP API");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert!(body["timestamp"].as_str().unwrap().contains('T'));
    assert_eq!(connector.stats().initialize_calls, 0);
}

#[tokio::test]
async fn test_account_info_success() {
    let connector = InMemoryConnector::new().with_account(
        Record::new()
            .with("login", json!(10008011380u64))
            .with("balance", json!(10000.0))
            .with("currency", json!("USD"))
            .with(
                "last_update",
                NaiveDate::from_ymd_opt(2023, 1, 2)
                    .unwrap()
                    .and_hms_opt(3, 4, 5)
                    .unwrap(),
            ),
    );

    let (status, body) = send(
        make_app(connector.clone()),
        post_json("/api/v1/account-info", account_body()),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"]["currency"], "USD");
    assert_eq!(body["data"]["last_update"], "2023-01-02T03:04:05");

    let stats = connector.stats();
    assert_eq!(stats.logins, vec![10008011380]);
    assert_eq!(stats.shutdown_calls, 1);
}

#[tokio::test]
async fn test_account_info_missing_field_never_opens_session() {
    let connector = InMemoryConnector::new();
    let (status, body) = send(
        make_app(connector.clone()),
        post_json(
            "/api/v1/account-info",
            json!({"login": 1, "server": "MetaQuotes-Demo"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
    assert!(body["message"].as_str().unwrap().contains("password"));
    assert_eq!(connector.stats().initialize_calls, 0);
}

#[tokio::test]
async fn test_account_info_requires_body() {
    let connector = InMemoryConnector::new();

    for raw in ["", "{}", "null"] {
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/account-info")
            .header("content-type", "application/json")
            .body(Body::from(raw))
            .unwrap();
        let (status, body) = send(make_app(connector.clone()), request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "body {raw:?}");
        assert_eq!(body["message"], "Request body is required");
    }

    assert_eq!(connector.stats().initialize_calls, 0);
}

#[tokio::test]
async fn test_account_info_login_failure() {
    let connector = InMemoryConnector::new()
        .with_login_error(NativeError::new(-6, "Terminal: Authorization failed"));

    let (status, body) = send(
        make_app(connector.clone()),
        post_json("/api/v1/account-info", account_body()),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["status"], "error");
    let message = body["message"].as_str().unwrap();
    assert!(message.contains("MT5 init failed"));
    assert!(message.contains("Terminal: Authorization failed"));
    assert_eq!(body["details"], json!([-6, "Terminal: Authorization failed"]));
    assert_eq!(connector.stats().shutdown_calls, 1);
}

#[tokio::test]
async fn test_account_info_fetch_failure() {
    let connector = InMemoryConnector::new()
        .with_fetch_error(NativeError::new(-10004, "No IPC connection"));

    let (status, body) = send(
        make_app(connector.clone()),
        post_json("/api/v1/account-info", account_body()),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Failed to get account info");
    assert_eq!(body["details"], json!([-10004, "No IPC connection"]));
    assert_eq!(connector.stats().shutdown_calls, 1);
}

#[tokio::test]
async fn test_account_info_panic_still_closes_session() {
    let connector = InMemoryConnector::new().panicking_on_fetch();

    let (status, body) = send(
        make_app(connector.clone()),
        post_json("/api/v1/account-info", account_body()),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["status"], "error");
    assert_eq!(body["message"], "terminal connection dropped");

    let stats = connector.stats();
    assert_eq!(stats.initialize_calls, 1);
    assert_eq!(stats.shutdown_calls, 1);
}

#[tokio::test]
async fn test_history_single_day_includes_deals_on_to_date() {
    let connector = InMemoryConnector::new().with_deals(vec![
        Record::new()
            .with("ticket", json!(101))
            .with("time", json!(1672531200)) // 2023-01-01T00:00:00
            .with("symbol", json!("EURUSD")),
        Record::new()
            .with("ticket", json!(102))
            .with("time", json!(1672617600)) // 2023-01-02T00:00:00
            .with("symbol", json!("EURUSD")),
    ]);

    let (status, body) = send(
        make_app(connector.clone()),
        post_json("/api/v1/history", history_body("2023-01-01", "2023-01-01")),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["ticket"], 101);
    assert_eq!(body["data"][0]["time"], "2023-01-01T00:00:00");
    assert_eq!(
        body["date_range"],
        json!({"from": "2023-01-01", "to": "2023-01-01"})
    );

    let day = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
    let stats = connector.stats();
    assert_eq!(
        stats.deal_queries,
        vec![(
            day.and_hms_opt(0, 0, 0).unwrap(),
            day.succ_opt().unwrap().and_hms_opt(0, 0, 0).unwrap()
        )]
    );
    assert_eq!(stats.shutdown_calls, 1);
}

#[tokio::test]
async fn test_history_empty_result_is_success() {
    let connector = InMemoryConnector::new().with_deals(vec![]);

    let (status, body) = send(
        make_app(connector),
        post_json("/api/v1/history", history_body("2023-01-01", "2023-01-31")),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 0);
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn test_history_terminal_failure_is_not_found() {
    let connector = InMemoryConnector::new()
        .without_deals()
        .with_fetch_error(NativeError::new(-1, "Terminal: Call failed"));

    let (status, body) = send(
        make_app(connector.clone()),
        post_json("/api/v1/history", history_body("2023-01-01", "2023-01-31")),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], "error");
    assert_eq!(
        body["message"],
        "No deals found or MT5 error: (-1, 'Terminal: Call failed')"
    );
    assert_eq!(body["details"], json!([-1, "Terminal: Call failed"]));
    assert_eq!(connector.stats().shutdown_calls, 1);
}

#[tokio::test]
async fn test_history_missing_field_never_opens_session() {
    let connector = InMemoryConnector::new();
    let mut body = history_body("2023-01-01", "2023-01-31");
    body.as_object_mut().unwrap().remove("to_date");

    let (status, body) = send(
        make_app(connector.clone()),
        post_json("/api/v1/history", body),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
    assert_eq!(body["message"], "Validation error: missing field `to_date`");
    assert!(body.get("details").is_none());
    assert_eq!(connector.stats().initialize_calls, 0);
}

#[tokio::test]
async fn test_dropped_request_still_closes_session() {
    let gate = Arc::new(Notify::new());
    let connector = InMemoryConnector::new()
        .with_account(Record::new().with("login", json!(10008011380u64)))
        .holding_next_fetch(gate.clone());
    let app = make_app(connector.clone());

    // The client gives up while the terminal call is still pending
    let abandoned = tokio::time::timeout(
        Duration::from_millis(100),
        app.clone()
            .oneshot(post_json("/api/v1/account-info", account_body())),
    )
    .await;
    assert!(abandoned.is_err());

    let stats = connector.stats();
    assert_eq!(stats.account_info_calls, 1);
    assert!(stats.session_open);

    gate.notify_one();

    let (status, _) = send(app, post_json("/api/v1/account-info", account_body())).await;
    assert_eq!(status, StatusCode::OK);

    let stats = connector.stats();
    assert_eq!(stats.initialize_calls, 2);
    assert_eq!(stats.shutdown_calls, 2);
    assert!(!stats.session_open);
}

#[tokio::test]
async fn test_history_bad_date_never_opens_session() {
    let connector = InMemoryConnector::new();

    for (from, to) in [("2023/01/01", "2023-01-31"), ("2023-01-01", "31-01-2023")] {
        let (status, body) = send(
            make_app(connector.clone()),
            post_json("/api/v1/history", history_body(from, to)),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"]
            .as_str()
            .unwrap()
            .contains("Date must be in YYYY-MM-DD format"));
    }

    assert_eq!(connector.stats().initialize_calls, 0);
}

#[tokio::test]
async fn test_history_unreadable_deal_time_is_server_error() {
    let connector = InMemoryConnector::new().with_deals(vec![Record::new()
        .with("ticket", json!(1))
        .with("time", json!("not a time"))]);

    let (status, body) = send(
        make_app(connector.clone()),
        post_json("/api/v1/history", history_body("2023-01-01", "2023-01-31")),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("not a Unix timestamp"));
    assert_eq!(connector.stats().shutdown_calls, 1);
}

#[tokio::test]
async fn test_unknown_route() {
    let request = Request::builder()
        .uri("/api/v1/unknown")
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(make_app(InMemoryConnector::new()), request).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body,
        json!({"status": "error", "message": "Endpoint not found"})
    );
}

#[tokio::test]
async fn test_wrong_method() {
    let request = Request::builder()
        .uri("/api/v1/account-info")
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(make_app(InMemoryConnector::new()), request).await;

    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["message"], "Method not allowed");
}

#[tokio::test]
async fn test_request_id_is_propagated() {
    let request = Request::builder()
        .uri("/api/v1/health")
        .header("x-request-id", "abc-123")
        .body(Body::empty())
        .unwrap();

    let response = make_app(InMemoryConnector::new())
        .oneshot(request)
        .await
        .unwrap();

    assert_eq!(response.headers()["x-request-id"], "abc-123");
}
