//! Integration tests for batch import and update

use pbaudit_store::batch::SIMULATED_ID_LEN;
use pbaudit_store::{BatchStatus, StoreClient};
use serde_json::json;
use wiremock::matchers::{body_json, body_partial_json, method, path, path_regex};
use wiremock::{Mock, ResponseTemplate};

use crate::common;

// ============================================================================
// Import
// ============================================================================

#[tokio::test]
async fn test_import_creates_missing_and_skips_existing() {
    let (server, client) = common::authenticated_store_mock().await;

    Mock::given(method("POST"))
        .and(path(common::RECORDS_PATH))
        .and(body_partial_json(json!({"account": "A1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::record_body(
            "rec00000000000a",
            json!({"account": "A1"}),
        )))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(common::RECORDS_PATH))
        .and(body_partial_json(json!({"account": "A3"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::record_body(
            "rec00000000000c",
            json!({"account": "A3"}),
        )))
        .expect(1)
        .mount(&server)
        .await;

    let input = vec![
        common::flat_audit("A1", "2023-01-15", None),
        common::flat_audit("A2", "2023-02-01", Some("existing0000002")),
        common::flat_audit("A3", "2023-03-01", None),
    ];
    let result = client.batch_import_audits(common::COLLECTION, &input).await;

    assert_eq!(result.len(), 3);
    let records = result.records();
    assert_eq!(records[0].id.as_deref(), Some("rec00000000000a"));
    assert_eq!(records[1], input[1]);
    assert_eq!(records[2].id.as_deref(), Some("rec00000000000c"));
    // Local fields are kept; only the id is added
    assert_eq!(records[0].without_id(), input[0]);

    let counts = result.counts();
    assert_eq!(counts.created, 2);
    assert_eq!(counts.skipped, 1);
    assert_eq!(counts.failed, 0);
}

#[tokio::test]
async fn test_import_sends_record_without_id_field() {
    let (server, client) = common::authenticated_store_mock().await;

    let audit = common::flat_audit("A1", "2023-01-15", None);
    Mock::given(method("POST"))
        .and(path(common::RECORDS_PATH))
        .and(body_json(json!({
            "account": "A1",
            "date": "2023-01-15T00:00:00.000Z",
            "status": "completed",
            "note": "",
            "visited_floors": "[3, 4]",
            "score": null
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::record_body(
            "rec000000000001",
            json!({}),
        )))
        .expect(1)
        .mount(&server)
        .await;

    let result = client.batch_import_audits(common::COLLECTION, &[audit]).await;
    assert_eq!(result.items[0].status, BatchStatus::Created);
}

#[tokio::test]
async fn test_import_failure_passes_record_through() {
    let (server, client) = common::authenticated_store_mock().await;

    Mock::given(method("POST"))
        .and(path(common::RECORDS_PATH))
        .and(body_partial_json(json!({"account": "BAD"})))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "code": 400,
            "message": "Failed to create record.",
            "data": {"date": {"code": "validation_required"}}
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(common::RECORDS_PATH))
        .and(body_partial_json(json!({"account": "A2"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::record_body(
            "rec000000000002",
            json!({"account": "A2"}),
        )))
        .mount(&server)
        .await;

    let input = vec![
        common::flat_audit("BAD", "2023-01-15", None),
        common::flat_audit("A2", "2023-02-01", None),
    ];
    let result = client.batch_import_audits(common::COLLECTION, &input).await;

    let records = result.records();
    assert_eq!(records[0], input[0]);
    assert!(!records[0].has_id());
    assert_eq!(records[1].id.as_deref(), Some("rec000000000002"));

    let failures: Vec<_> = result.failures().collect();
    assert_eq!(failures.len(), 1);
    assert!(matches!(
        &failures[0].status,
        BatchStatus::Failed { reason } if reason.contains("Failed to create record.")
    ));
}

#[tokio::test]
async fn test_import_is_idempotent_on_its_own_output() {
    let (server, client) = common::authenticated_store_mock().await;

    // Exactly two creates across both runs
    Mock::given(method("POST"))
        .and(path(common::RECORDS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::record_body(
            "rec000000000001",
            json!({}),
        )))
        .expect(2)
        .mount(&server)
        .await;

    let input = vec![
        common::flat_audit("A1", "2023-01-15", None),
        common::flat_audit("A2", "2023-02-01", None),
    ];
    let first = client
        .batch_import_audits(common::COLLECTION, &input)
        .await
        .into_records();
    let second = client.batch_import_audits(common::COLLECTION, &first).await;

    assert_eq!(second.counts().skipped, 2);
    assert_eq!(second.into_records(), first);
}

#[tokio::test]
async fn test_import_requests_follow_input_order() {
    let (server, client) = common::authenticated_store_mock().await;

    Mock::given(method("POST"))
        .and(path(common::RECORDS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::record_body(
            "rec000000000001",
            json!({}),
        )))
        .mount(&server)
        .await;

    let input = vec![
        common::flat_audit("C", "2023-01-01", None),
        common::flat_audit("A", "2023-01-02", None),
        common::flat_audit("B", "2023-01-03", None),
    ];
    client.batch_import_audits(common::COLLECTION, &input).await;

    let accounts: Vec<String> = common::requests_to(&server, "POST", common::RECORDS_PATH)
        .await
        .iter()
        .map(|r| common::body_of(r)["account"].as_str().unwrap_or_default().to_string())
        .collect();
    assert_eq!(accounts, vec!["C", "A", "B"]);
}

#[tokio::test]
async fn test_import_simulated_when_unauthenticated() {
    let (server, client) = common::setup_store_mock().await;

    Mock::given(path_regex(r"^/api/collections/audits/records.*$"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let input = vec![
        common::flat_audit("A1", "2023-01-15", None),
        common::flat_audit("A2", "2023-02-01", Some("existing0000002")),
    ];
    let result = client.batch_import_audits(common::COLLECTION, &input).await;

    assert_eq!(result.items[0].status, BatchStatus::Simulated);
    assert_eq!(result.items[1].status, BatchStatus::Skipped);
    let simulated_id = result.items[0].record.id.clone().unwrap_or_default();
    assert_eq!(simulated_id.len(), SIMULATED_ID_LEN);
    assert_eq!(result.items[1].record.id.as_deref(), Some("existing0000002"));
}

// ============================================================================
// Update
// ============================================================================

#[tokio::test]
async fn test_update_patches_without_id_every_run() {
    let (server, client) = common::authenticated_store_mock().await;

    Mock::given(method("PATCH"))
        .and(path(format!("{}/rec000000000001", common::RECORDS_PATH)))
        .and(body_json(json!({
            "account": "A1",
            "date": "2023-01-15T00:00:00.000Z",
            "status": "completed",
            "note": "",
            "visited_floors": "[3, 4]",
            "score": null
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::record_body(
            "rec000000000001",
            json!({"account": "A1"}),
        )))
        .expect(2)
        .mount(&server)
        .await;

    let input = vec![common::flat_audit("A1", "2023-01-15", Some("rec000000000001"))];
    let first = client.batch_update_audits(common::COLLECTION, &input).await;
    let second = client.batch_update_audits(common::COLLECTION, &input).await;

    assert_eq!(first.counts().updated, 1);
    assert_eq!(second.counts().updated, 1);
    assert_eq!(first.into_records(), input);
}

#[tokio::test]
async fn test_update_returns_local_records_not_server_state() {
    let (server, client) = common::authenticated_store_mock().await;

    Mock::given(method("PATCH"))
        .and(path(format!("{}/rec000000000001", common::RECORDS_PATH)))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::record_body(
            "rec000000000001",
            json!({"account": "A1", "score": 99, "note": "server side"}),
        )))
        .mount(&server)
        .await;

    let input = vec![common::flat_audit("A1", "2023-01-15", Some("rec000000000001"))];
    let result = client.batch_update_audits(common::COLLECTION, &input).await;

    let records = result.into_records();
    assert_eq!(records, input);
    assert!(records[0].score.is_none());
    assert_eq!(records[0].note, "");
}

#[tokio::test]
async fn test_update_skips_missing_id_and_survives_failures() {
    let (server, client) = common::authenticated_store_mock().await;

    Mock::given(method("PATCH"))
        .and(path(format!("{}/gone00000000000", common::RECORDS_PATH)))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "code": 404,
            "message": "The requested resource wasn't found."
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path(format!("{}/rec000000000003", common::RECORDS_PATH)))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::record_body(
            "rec000000000003",
            json!({}),
        )))
        .expect(1)
        .mount(&server)
        .await;

    let input = vec![
        common::flat_audit("A1", "2023-01-15", None),
        common::flat_audit("A2", "2023-02-01", Some("gone00000000000")),
        common::flat_audit("A3", "2023-03-01", Some("rec000000000003")),
    ];
    let result = client.batch_update_audits(common::COLLECTION, &input).await;

    assert_eq!(result.items[0].status, BatchStatus::Skipped);
    assert!(result.items[1].status.is_failed());
    assert_eq!(result.items[2].status, BatchStatus::Updated);
    assert_eq!(result.into_records(), input);
}

#[tokio::test]
async fn test_update_simulated_when_unauthenticated() {
    let (server, client) = common::setup_store_mock().await;

    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let input = vec![common::flat_audit("A1", "2023-01-15", Some("rec000000000001"))];
    let result = client.batch_update_audits(common::COLLECTION, &input).await;

    assert_eq!(result.items[0].status, BatchStatus::Simulated);
    assert_eq!(result.into_records(), input);
}

#[tokio::test]
async fn test_failed_login_leaves_batch_simulated() {
    let mut client = StoreClient::new("http://127.0.0.1:1");
    // Not authenticated against a dead server: import stays local
    assert!(!client.authenticate(common::IDENTITY, common::PASSWORD).await);

    let input = vec![common::flat_audit("A1", "2023-01-15", None)];
    let result = client.batch_import_audits(common::COLLECTION, &input).await;
    assert_eq!(result.counts().simulated, 1);
}
