//! Integration tests for password authentication

use pbaudit_store::{StoreClient, StoreError};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common;

#[tokio::test]
async fn test_authenticate_stores_token() {
    let (_server, mut client) = common::setup_store_mock().await;

    assert!(!client.is_authenticated());
    assert!(client.authenticate(common::IDENTITY, common::PASSWORD).await);
    assert!(client.is_authenticated());
    assert_eq!(client.token(), Some(common::TOKEN));
}

#[tokio::test]
async fn test_authenticate_wrong_password_stays_unauthenticated() {
    let (_server, mut client) = common::setup_store_mock().await;

    assert!(!client.authenticate(common::IDENTITY, "wrong").await);
    assert!(!client.is_authenticated());

    let err = client
        .try_authenticate(common::IDENTITY, "wrong")
        .await
        .unwrap_err();
    assert!(
        matches!(err, StoreError::BadRequest(ref msg) if msg == "Failed to authenticate."),
        "unexpected error: {err:?}"
    );
}

#[tokio::test]
async fn test_authenticate_requires_token_in_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(common::AUTH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"record": {}})))
        .mount(&server)
        .await;

    let mut client = StoreClient::new(server.uri());
    assert!(!client.authenticate(common::IDENTITY, common::PASSWORD).await);
    assert!(!client.is_authenticated());
}

#[tokio::test]
async fn test_authenticate_non_200_success_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(common::AUTH_PATH))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"token": "t"})))
        .mount(&server)
        .await;

    let mut client = StoreClient::new(server.uri());
    let err = client
        .try_authenticate(common::IDENTITY, common::PASSWORD)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::UnexpectedStatus { status: 201, .. }));
    assert!(!client.is_authenticated());
}

#[tokio::test]
async fn test_authenticate_network_fault_returns_false() {
    // Nothing listens on port 1
    let mut client = StoreClient::new("http://127.0.0.1:1");

    assert!(!client.authenticate(common::IDENTITY, common::PASSWORD).await);
    assert!(!client.is_authenticated());

    let err = client
        .try_authenticate(common::IDENTITY, common::PASSWORD)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Network(_)));
}

#[tokio::test]
async fn test_failed_reauthentication_keeps_existing_token() {
    let (_server, mut client) = common::authenticated_store_mock().await;

    assert!(!client.authenticate(common::IDENTITY, "wrong").await);
    assert!(client.is_authenticated());
    assert_eq!(client.token(), Some(common::TOKEN));
}
