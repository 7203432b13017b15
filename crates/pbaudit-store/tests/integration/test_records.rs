//! Integration tests for the record primitives

use pbaudit_store::{ListQuery, StoreClient, StoreError};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common;

fn bearer() -> String {
    format!("Bearer {}", common::TOKEN)
}

#[tokio::test]
async fn test_create_record_sends_bearer_and_returns_record() {
    let (server, client) = common::authenticated_store_mock().await;

    Mock::given(method("POST"))
        .and(path(common::RECORDS_PATH))
        .and(header("Authorization", bearer().as_str()))
        .and(body_json(json!({"account": "A1", "status": "completed"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::record_body(
            "rec000000000001",
            json!({"account": "A1", "status": "completed"}),
        )))
        .expect(1)
        .mount(&server)
        .await;

    let record = client
        .create_record(common::COLLECTION, &json!({"account": "A1", "status": "completed"}))
        .await
        .expect("record created");

    assert_eq!(record.id, "rec000000000001");
    assert_eq!(record.collection_name.as_deref(), Some(common::COLLECTION));
    assert_eq!(record.field("account"), Some(&json!("A1")));
}

#[tokio::test]
async fn test_unauthenticated_primitives_make_no_requests() {
    let (server, client) = common::setup_store_mock().await;

    Mock::given(wiremock::matchers::path_regex(r"^/api/collections/audits/records.*$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    assert!(client
        .create_record(common::COLLECTION, &json!({"account": "A1"}))
        .await
        .is_none());
    assert!(client
        .update_record(common::COLLECTION, "rec1", &json!({"note": "x"}))
        .await
        .is_none());
    assert!(client.get_record(common::COLLECTION, "rec1").await.is_none());
    assert!(client
        .list_records(common::COLLECTION, &ListQuery::default())
        .await
        .is_none());
    assert!(!client.delete_record(common::COLLECTION, "rec1").await);

    let err = client
        .try_get_record(common::COLLECTION, "rec1")
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotAuthenticated));
}

#[tokio::test]
async fn test_update_record_patches_by_id() {
    let (server, client) = common::authenticated_store_mock().await;

    Mock::given(method("PATCH"))
        .and(path(format!("{}/rec000000000001", common::RECORDS_PATH)))
        .and(header("Authorization", bearer().as_str()))
        .and(body_json(json!({"note": "rechecked"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::record_body(
            "rec000000000001",
            json!({"note": "rechecked"}),
        )))
        .expect(1)
        .mount(&server)
        .await;

    let record = client
        .update_record(common::COLLECTION, "rec000000000001", &json!({"note": "rechecked"}))
        .await
        .expect("record updated");
    assert_eq!(record.field("note"), Some(&json!("rechecked")));
}

#[tokio::test]
async fn test_get_record_not_found() {
    let (server, client) = common::authenticated_store_mock().await;

    Mock::given(method("GET"))
        .and(path(format!("{}/missing", common::RECORDS_PATH)))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "code": 404,
            "message": "The requested resource wasn't found.",
            "data": {}
        })))
        .mount(&server)
        .await;

    assert!(client.get_record(common::COLLECTION, "missing").await.is_none());

    let err = client
        .try_get_record(common::COLLECTION, "missing")
        .await
        .unwrap_err();
    assert!(
        matches!(err, StoreError::NotFound(ref msg) if msg.contains("wasn't found")),
        "unexpected error: {err:?}"
    );
}

#[tokio::test]
async fn test_list_records_passes_query_parameters() {
    let (server, client) = common::authenticated_store_mock().await;

    Mock::given(method("GET"))
        .and(path(common::RECORDS_PATH))
        .and(query_param("page", "2"))
        .and(query_param("perPage", "10"))
        .and(query_param("filter", "account = 'A1'"))
        .and(query_param("sort", "-date"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "page": 2,
            "perPage": 10,
            "totalItems": 11,
            "totalPages": 2,
            "items": [common::record_body("rec000000000011", json!({"account": "A1"}))]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let query = ListQuery::default()
        .with_filter("account = 'A1'")
        .with_sort("-date")
        .with_page(2, 10);
    let page = client
        .list_records(common::COLLECTION, &query)
        .await
        .expect("page listed");

    assert_eq!(page.page, 2);
    assert_eq!(page.total_items, 11);
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].id, "rec000000000011");
}

#[tokio::test]
async fn test_delete_record() {
    let (server, client) = common::authenticated_store_mock().await;

    Mock::given(method("DELETE"))
        .and(path(format!("{}/rec000000000001", common::RECORDS_PATH)))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(format!("{}/gone", common::RECORDS_PATH)))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Not found."})))
        .mount(&server)
        .await;

    assert!(client.delete_record(common::COLLECTION, "rec000000000001").await);
    assert!(!client.delete_record(common::COLLECTION, "gone").await);
}

#[tokio::test]
async fn test_server_error_maps_to_error_variant() {
    let (server, client) = common::authenticated_store_mock().await;

    Mock::given(method("POST"))
        .and(path(common::RECORDS_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let err = client
        .try_create_record(common::COLLECTION, &json!({"account": "A1"}))
        .await
        .unwrap_err();
    assert!(
        matches!(err, StoreError::ServerError(ref msg) if msg == "boom"),
        "unexpected error: {err:?}"
    );
}

#[tokio::test]
async fn test_invalid_record_body_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(common::AUTH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": common::TOKEN})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{}/rec1", common::RECORDS_PATH)))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let mut client = StoreClient::new(format!("{}/", server.uri()));
    assert!(client.authenticate(common::IDENTITY, common::PASSWORD).await);

    let err = client
        .try_get_record(common::COLLECTION, "rec1")
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_record_id_with_slash_stays_one_segment() {
    let (server, client) = common::authenticated_store_mock().await;

    Mock::given(method("GET"))
        .and(path(format!("{}/a%2Fb", common::RECORDS_PATH)))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::record_body(
            "a/b",
            json!({"account": "A1"}),
        )))
        .expect(1)
        .mount(&server)
        .await;

    let record = client
        .get_record(common::COLLECTION, "a/b")
        .await
        .expect("record fetched");
    assert_eq!(record.id, "a/b");

    let requests = common::requests_to(&server, "GET", &format!("{}/a%2Fb", common::RECORDS_PATH)).await;
    assert_eq!(requests.len(), 1);
}

#[tokio::test]
async fn test_dot_record_id_is_rejected_without_request() {
    let (server, client) = common::authenticated_store_mock().await;

    let err = client
        .try_update_record(common::COLLECTION, "..", &json!({"note": "x"}))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::InvalidUrl(_)));
    assert!(common::requests_to(&server, "PATCH", common::RECORDS_PATH).await.is_empty());
}
