//! Pact integration tests for the Cloud Storage REST client
//!
//! Each test starts a Pact mock server, points `GcsREST` at it through
//! `PACT_MODE` and `GCS_ENDPOINT`, and drives the real client against the
//! contract.
//!
//! **Note**: These tests share process environment variables.
//! Run with: `cargo test --test pact_gcs_storage -- --test-threads=1`

#[cfg(test)]
mod common;

use common::init_rustls;
use pact_consumer::prelude::*;
use serde_json::json;
use shoplift_operator::storage::{GcsREST, ObjectStore, StorageError};
use std::env;
use std::sync::Once;

static INIT: Once = Once::new();

fn init_test() {
    INIT.call_once(|| {
        init_rustls();
        env::set_var("PACT_MODE", "true");
    });
}

/// Start the mock server and build a client for it. The returned server must
/// stay in scope for the duration of the test.
fn setup_store(
    pact_builder: &mut PactBuilder,
) -> (Box<dyn pact_consumer::mock_server::ValidatingMockServer>, GcsREST) {
    let mock_server = pact_builder.start_mock_server(None, None);
    let mut base_url = mock_server.url().to_string();
    if base_url.ends_with('/') {
        base_url.pop();
    }
    env::set_var("GCS_ENDPOINT", &base_url);
    let store = GcsREST::new().expect("Failed to create Cloud Storage client");
    (mock_server, store)
}

fn cleanup() {
    env::remove_var("GCS_ENDPOINT");
}

#[tokio::test]
async fn test_download_config_object_with_pact() {
    init_test();
    let mut pact_builder = PactBuilder::new("Shoplift-Ingest", "Cloud-Storage");

    pact_builder.interaction("download a client configuration", "", |mut i| {
        i.given("object acme.xml exists in bucket uploads");
        i.request
            .method("GET")
            .path("/storage/v1/b/uploads/o/acme.xml")
            .query_param("alt", "media")
            .header("authorization", "Bearer test-token");
        i.response
            .status(200)
            .header("content-type", "application/xml")
            .body("<config><camera id=\"1\"/></config>");
        i
    });

    let (_mock_server, store) = setup_store(&mut pact_builder);

    let content = store.download_text("uploads", "acme.xml").await;
    assert_eq!(
        content.expect("download should succeed"),
        "<config><camera id=\"1\"/></config>"
    );

    cleanup();
}

#[tokio::test]
async fn test_download_missing_object_with_pact() {
    init_test();
    let mut pact_builder = PactBuilder::new("Shoplift-Ingest", "Cloud-Storage");

    pact_builder.interaction("download an object that does not exist", "", |mut i| {
        i.given("object gone.xml does not exist in bucket uploads");
        i.request
            .method("GET")
            .path("/storage/v1/b/uploads/o/gone.xml")
            .query_param("alt", "media")
            .header("authorization", "Bearer test-token");
        i.response
            .status(404)
            .header("content-type", "application/json")
            .json_body(json!({
                "error": {
                    "code": 404,
                    "message": "No such object: uploads/gone.xml"
                }
            }));
        i
    });

    let (_mock_server, store) = setup_store(&mut pact_builder);

    let result = store.download_text("uploads", "gone.xml").await;
    assert!(
        matches!(result, Err(StorageError::NotFound { .. })),
        "expected NotFound, got {result:?}"
    );

    cleanup();
}

#[tokio::test]
async fn test_copy_object_with_pact() {
    init_test();
    let mut pact_builder = PactBuilder::new("Shoplift-Ingest", "Cloud-Storage");

    pact_builder.interaction("copy an object within a bucket", "", |mut i| {
        i.given("object acme.xml exists in bucket uploads");
        i.request
            .method("POST")
            .path("/storage/v1/b/uploads/o/acme.xml/copyTo/b/uploads/o/archived-acme.xml")
            .header("authorization", "Bearer test-token")
            .header("content-type", "application/json")
            .json_body(json!({}));
        i.response
            .status(200)
            .header("content-type", "application/json")
            .json_body(json!({
                "kind": "storage#object",
                "bucket": "uploads",
                "name": "archived-acme.xml",
                "generation": "1712345678000000"
            }));
        i
    });

    let (_mock_server, store) = setup_store(&mut pact_builder);

    let result = store
        .copy_object("uploads", "acme.xml", "archived-acme.xml")
        .await;
    assert!(result.is_ok(), "copy failed: {result:?}");

    cleanup();
}

#[tokio::test]
async fn test_delete_object_with_pact() {
    init_test();
    let mut pact_builder = PactBuilder::new("Shoplift-Ingest", "Cloud-Storage");

    pact_builder.interaction("delete an object", "", |mut i| {
        i.given("object acme.xml exists in bucket uploads");
        i.request
            .method("DELETE")
            .path("/storage/v1/b/uploads/o/acme.xml")
            .header("authorization", "Bearer test-token");
        i.response.status(204);
        i
    });

    let (_mock_server, store) = setup_store(&mut pact_builder);

    let result = store.delete_object("uploads", "acme.xml").await;
    assert!(result.is_ok(), "delete failed: {result:?}");

    cleanup();
}

#[tokio::test]
async fn test_delete_permission_denied_with_pact() {
    init_test();
    let mut pact_builder = PactBuilder::new("Shoplift-Ingest", "Cloud-Storage");

    pact_builder.interaction("delete an object without permission", "", |mut i| {
        i.given("the caller lacks storage.objects.delete");
        i.request
            .method("DELETE")
            .path("/storage/v1/b/uploads/o/locked.xml")
            .header("authorization", "Bearer test-token");
        i.response
            .status(403)
            .header("content-type", "application/json")
            .json_body(json!({
                "error": {
                    "code": 403,
                    "message": "caller does not have storage.objects.delete access",
                    "status": "PERMISSION_DENIED"
                }
            }));
        i
    });

    let (_mock_server, store) = setup_store(&mut pact_builder);

    match store.delete_object("uploads", "locked.xml").await {
        Err(StorageError::Api { status, message }) => {
            assert_eq!(status, 403);
            assert!(message.contains("storage.objects.delete"));
        }
        other => panic!("expected API error, got {other:?}"),
    }

    cleanup();
}
