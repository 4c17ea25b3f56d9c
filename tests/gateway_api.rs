//! Black-box HTTP tests against a gateway bound to an ephemeral port.

use std::sync::Arc;
use std::time::Duration;

use internal_transfers::config::LedgerConfig;
use internal_transfers::gateway::{self, build_router, state::AppState};
use internal_transfers::service::LedgerService;
use reqwest::StatusCode;
use serde_json::{Value, json};
use tokio::net::TcpListener;

async fn spawn_app() -> String {
    let ledger = Arc::new(LedgerService::in_memory(&LedgerConfig::default()));
    let app = build_router(AppState::new(ledger));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(gateway::serve(
        listener,
        app,
        std::future::pending(),
        Duration::from_secs(1),
    ));
    format!("http://{addr}")
}

async fn post(client: &reqwest::Client, url: String, body: Value) -> (StatusCode, Value) {
    let resp = client.post(url).json(&body).send().await.unwrap();
    let status = resp.status();
    (status, resp.json().await.unwrap())
}

async fn get(client: &reqwest::Client, url: String) -> (StatusCode, Value) {
    let resp = client.get(url).send().await.unwrap();
    let status = resp.status();
    (status, resp.json().await.unwrap())
}

async fn create(client: &reqwest::Client, base: &str, id: &str, balance: &str) {
    let (status, _) = post(
        client,
        format!("{base}/accounts"),
        json!({ "account_id": id, "initial_balance": balance }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn health_reports_ok_with_version() {
    let base = spawn_app().await;
    let (status, body) = get(&reqwest::Client::new(), format!("{base}/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["version"].as_str().unwrap().starts_with(env!("CARGO_PKG_VERSION")));
}

#[tokio::test]
async fn create_and_get_account() {
    let base = spawn_app().await;
    let client = reqwest::Client::new();

    let (status, body) = post(
        &client,
        format!("{base}/accounts"),
        json!({ "account_id": " acc-1 ", "initial_balance": "100.50" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({ "account_id": "acc-1", "balance": "100.5" }));

    let (status, body) = get(&client, format!("{base}/accounts/acc-1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["balance"], "100.5");
}

#[tokio::test]
async fn account_errors_map_to_status_codes() {
    let base = spawn_app().await;
    let client = reqwest::Client::new();
    create(&client, &base, "dup", "1").await;

    let (status, body) = post(
        &client,
        format!("{base}/accounts"),
        json!({ "account_id": "dup", "initial_balance": "5" }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "ACCOUNT_EXISTS");

    let (status, body) = post(
        &client,
        format!("{base}/accounts"),
        json!({ "account_id": "neg", "initial_balance": "-1" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "NEGATIVE_BALANCE");

    let (status, body) = post(
        &client,
        format!("{base}/accounts"),
        json!({ "initial_balance": "5" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "MISSING_FIELD");
    assert_eq!(body["msg"], "account_id is required");

    let (status, body) = get(&client, format!("{base}/accounts/ghost")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "ACCOUNT_NOT_FOUND");
}

#[tokio::test]
async fn malformed_json_is_rejected() {
    let base = spawn_app().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/accounts"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["code"], "INVALID_JSON");

    // amounts must be strings
    let (status, body) = post(
        &client,
        format!("{base}/transactions"),
        json!({ "source_account_id": "a", "destination_account_id": "b", "amount": 10 }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_JSON");
}

#[tokio::test]
async fn transfer_flow() {
    let base = spawn_app().await;
    let client = reqwest::Client::new();
    create(&client, &base, "A", "100").await;
    create(&client, &base, "B", "0").await;

    let (status, body) = post(
        &client,
        format!("{base}/transactions"),
        json!({ "source_account_id": "A", "destination_account_id": "B", "amount": "40.00" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["source_account_id"], "A");
    assert_eq!(body["destination_account_id"], "B");
    assert_eq!(body["amount"], "40");
    assert_eq!(body["transfer_id"].as_str().unwrap().len(), 26);
    assert!(body["created_at"].is_string());

    let (_, a) = get(&client, format!("{base}/accounts/A")).await;
    let (_, b) = get(&client, format!("{base}/accounts/B")).await;
    assert_eq!(a["balance"], "60");
    assert_eq!(b["balance"], "40");
}

#[tokio::test]
async fn transfer_errors_map_to_status_codes() {
    let base = spawn_app().await;
    let client = reqwest::Client::new();
    create(&client, &base, "A", "10").await;
    create(&client, &base, "B", "0").await;

    let cases = [
        (json!({ "source_account_id": "A", "destination_account_id": "B", "amount": "11" }),
         StatusCode::BAD_REQUEST, "INSUFFICIENT_FUNDS"),
        (json!({ "source_account_id": "A", "destination_account_id": "Z", "amount": "1" }),
         StatusCode::NOT_FOUND, "DESTINATION_NOT_FOUND"),
        (json!({ "source_account_id": "Z", "destination_account_id": "B", "amount": "1" }),
         StatusCode::NOT_FOUND, "SOURCE_NOT_FOUND"),
        (json!({ "source_account_id": "A", "destination_account_id": "A", "amount": "1" }),
         StatusCode::BAD_REQUEST, "SAME_ACCOUNT"),
        (json!({ "source_account_id": "A", "destination_account_id": "B", "amount": "0" }),
         StatusCode::BAD_REQUEST, "NON_POSITIVE_AMOUNT"),
        (json!({ "source_account_id": "A", "destination_account_id": "B", "amount": "ten" }),
         StatusCode::BAD_REQUEST, "INVALID_AMOUNT"),
    ];

    for (req, want_status, want_code) in cases {
        let (status, body) = post(&client, format!("{base}/transactions"), req.clone()).await;
        assert_eq!(status, want_status, "request {req}");
        assert_eq!(body["code"], want_code, "request {req}");
    }

    let (_, a) = get(&client, format!("{base}/accounts/A")).await;
    assert_eq!(a["balance"], "10");
}

#[tokio::test]
async fn request_id_is_echoed_or_generated() {
    let base = spawn_app().await;
    let client = reqwest::Client::new();

    let resp = client
        .get(format!("{base}/health"))
        .header("x-request-id", "trace-123")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.headers()["x-request-id"], "trace-123");

    let resp = client.get(format!("{base}/health")).send().await.unwrap();
    let generated = resp.headers()["x-request-id"].to_str().unwrap();
    assert!(uuid::Uuid::parse_str(generated).is_ok());
}

#[tokio::test]
async fn openapi_document_is_served() {
    let base = spawn_app().await;
    let (status, body) = get(
        &reqwest::Client::new(),
        format!("{base}/api-docs/openapi.json"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/transactions"]["post"].is_object());
}

#[tokio::test]
async fn serve_stops_on_shutdown_signal() {
    let ledger = Arc::new(LedgerService::in_memory(&LedgerConfig::default()));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = tokio::sync::oneshot::channel::<()>();

    let server = tokio::spawn(gateway::serve(
        listener,
        build_router(AppState::new(ledger)),
        async move {
            let _ = rx.await;
        },
        Duration::from_millis(500),
    ));

    let resp = reqwest::get(format!("http://{addr}/health")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    tx.send(()).unwrap();
    let res = tokio::time::timeout(Duration::from_secs(5), server)
        .await
        .expect("server did not stop")
        .unwrap();
    assert!(res.is_ok());
}
