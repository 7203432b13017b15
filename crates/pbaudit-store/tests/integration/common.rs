//! Shared test helpers for record store integration tests
//!
//! Each helper mounts the necessary mock endpoints and returns a configured
//! StoreClient pointing at the mock server.

use pbaudit_core::domain::FlatAudit;
use pbaudit_store::StoreClient;
use serde_json::{json, Value};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

pub const AUTH_PATH: &str = "/api/collections/users/auth-with-password";
pub const RECORDS_PATH: &str = "/api/collections/audits/records";
pub const COLLECTION: &str = "audits";
pub const IDENTITY: &str = "auditor@example.com";
pub const PASSWORD: &str = "correct-horse";
pub const TOKEN: &str = "test-access-token";

/// Starts a mock server with the auth endpoint mounted and returns an
/// unauthenticated client pointing at it.
///
/// Only `IDENTITY` / `PASSWORD` are accepted; anything else gets a 400.
pub async fn setup_store_mock() -> (MockServer, StoreClient) {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(AUTH_PATH))
        .and(body_json(json!({"identity": IDENTITY, "password": PASSWORD})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": TOKEN,
            "record": {
                "id": "user00000000001",
                "collectionName": "users",
                "email": IDENTITY
            }
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(AUTH_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "code": 400,
            "message": "Failed to authenticate.",
            "data": {}
        })))
        .mount(&server)
        .await;

    let client = StoreClient::new(server.uri());
    (server, client)
}

/// Like [`setup_store_mock`], but the returned client is already authenticated
pub async fn authenticated_store_mock() -> (MockServer, StoreClient) {
    let (server, mut client) = setup_store_mock().await;
    assert!(client.authenticate(IDENTITY, PASSWORD).await);
    (server, client)
}

/// Builds a flat audit record for tests
pub fn flat_audit(account: &str, date: &str, id: Option<&str>) -> FlatAudit {
    let mut value = json!({
        "account": account,
        "date": format!("{}T00:00:00.000Z", date),
        "status": "completed",
        "note": "",
        "visited_floors": "[3, 4]",
        "score": null
    });
    if let Some(id) = id {
        value["id"] = json!(id);
    }
    serde_json::from_value(value).expect("valid flat audit")
}

/// A store record response body with the given id and fields
pub fn record_body(id: &str, fields: Value) -> Value {
    let mut body = json!({
        "id": id,
        "collectionId": "pbc_audits",
        "collectionName": COLLECTION,
        "created": "2024-03-01 12:00:00.000Z",
        "updated": "2024-03-01 12:00:00.000Z"
    });
    if let (Some(target), Some(extra)) = (body.as_object_mut(), fields.as_object()) {
        for (k, v) in extra {
            target.insert(k.clone(), v.clone());
        }
    }
    body
}

/// Requests received by the server for `http_method` on `request_path`, in arrival order
pub async fn requests_to(server: &MockServer, http_method: &str, request_path: &str) -> Vec<Request> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|r| r.method.to_string() == http_method && r.url.path() == request_path)
        .collect()
}

/// Parses a received request body as JSON
pub fn body_of(request: &Request) -> Value {
    serde_json::from_slice(&request.body).expect("request body is JSON")
}
