//! # Ingestion HTTP Server
//!
//! Provides endpoints:
//! - `POST /` - Cloud Storage object event (`{"bucket", "name", ...}`)
//! - `POST /pubsub` - Pub/Sub push envelope carrying a storage notification
//! - `GET /healthz` - Liveness probe
//! - `GET /metrics` - Prometheus metrics
//!
//! Failures answer 500 so the trigger redelivers the event.

use super::event::{PubSubPushEnvelope, StorageEvent, OBJECT_FINALIZE};
use super::pipeline::{IngestOutcome, Ingestor, SkipReason};
use crate::observability::metrics;
use crate::server::{healthz_handler, metrics_handler};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

pub fn router(ingestor: Arc<Ingestor>) -> Router {
    Router::new()
        .route("/", post(storage_event_handler))
        .route("/pubsub", post(pubsub_handler))
        .route("/healthz", get(healthz_handler))
        .route("/metrics", get(metrics_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(ingestor)
}

pub async fn serve(port: u16, ingestor: Arc<Ingestor>) -> Result<(), anyhow::Error> {
    let addr = format!("0.0.0.0:{port}");
    let listener = TcpListener::bind(&addr).await?;
    info!("Ingestion server listening on {}", addr);

    axum::serve(listener, router(ingestor))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Ingestion server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
}

async fn storage_event_handler(
    State(ingestor): State<Arc<Ingestor>>,
    Json(event): Json<StorageEvent>,
) -> Response {
    run(&ingestor, &event).await
}

async fn pubsub_handler(
    State(ingestor): State<Arc<Ingestor>>,
    Json(envelope): Json<PubSubPushEnvelope>,
) -> Response {
    let message = envelope.message;

    if let Some(event_type) = message.event_type() {
        if event_type != OBJECT_FINALIZE {
            info!("Ignoring {} notification", event_type);
            let outcome = IngestOutcome::Skipped {
                reason: SkipReason::UnsupportedEventType,
            };
            metrics::increment_ingestion_events(outcome.metric_label());
            return (StatusCode::OK, Json(outcome)).into_response();
        }
    }

    match message.storage_event(ingestor.config().default_bucket.as_deref()) {
        Ok(event) => run(&ingestor, &event).await,
        Err(e) => {
            warn!(
                "Rejecting Pub/Sub message {}: {}",
                message.message_id.as_deref().unwrap_or("unknown"),
                e
            );
            (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "outcome": "rejected", "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

async fn run(ingestor: &Ingestor, event: &StorageEvent) -> Response {
    match ingestor.handle(event).await {
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(e) => {
            error!("Ingestion of gs://{}/{} failed: {}", event.bucket, event.name, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "outcome": "failed", "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IngestConfig;
    use crate::ingest::cluster::{ClusterError, MockClientStore};
    use crate::storage::{MockObjectStore, StorageError};
    use axum::body::Body;
    use axum::http::Request;
    use base64::{engine::general_purpose, Engine as _};
    use tower::ServiceExt;

    fn app(store: MockObjectStore, clients: MockClientStore, config: IngestConfig) -> Router {
        router(Arc::new(Ingestor::new(
            Arc::new(store),
            Arc::new(clients),
            config,
        )))
    }

    fn happy_mocks() -> (MockObjectStore, MockClientStore) {
        let mut store = MockObjectStore::new();
        store.expect_download_text().returning(|_, _| Ok("<config/>".to_string()));
        store.expect_copy_object().returning(|_, _, _| Ok(()));
        store.expect_delete_object().returning(|_, _| Ok(()));
        let mut clients = MockClientStore::new();
        clients.expect_create_client().returning(|_| Ok(()));
        (store, clients)
    }

    async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn test_storage_event_is_ingested() {
        let (store, clients) = happy_mocks();
        let (status, body) = post_json(
            app(store, clients, IngestConfig::default()),
            "/",
            serde_json::json!({"bucket": "uploads", "name": "acme.xml", "size": "42"}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["outcome"], "ingested");
        assert_eq!(body["clientId"], "acme");
        assert_eq!(body["processedPath"], "processed/acme.xml");
    }

    #[tokio::test]
    async fn test_ignored_object_returns_skipped() {
        let (status, body) = post_json(
            app(MockObjectStore::new(), MockClientStore::new(), IngestConfig::default()),
            "/",
            serde_json::json!({"bucket": "uploads", "name": "notes.txt"}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["outcome"], "skipped");
        assert_eq!(body["reason"], "not_config_object");
    }

    #[tokio::test]
    async fn test_failure_returns_500_for_redelivery() {
        let mut store = MockObjectStore::new();
        store.expect_download_text().returning(|_, _| Ok("<config/>".to_string()));
        let mut clients = MockClientStore::new();
        clients.expect_create_client().returning(|_| {
            Err(ClusterError::AlreadyExists("acme".to_string()))
        });
        clients.expect_patch_client().returning(|_| {
            Err(ClusterError::Serialize(
                serde_json::from_str::<serde_json::Value>("{").unwrap_err(),
            ))
        });

        let (status, body) = post_json(
            app(store, clients, IngestConfig::default()),
            "/",
            serde_json::json!({"bucket": "uploads", "name": "acme.xml"}),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["outcome"], "failed");
    }

    #[tokio::test]
    async fn test_pubsub_notification_attributes() {
        let (store, clients) = happy_mocks();
        let (status, body) = post_json(
            app(store, clients, IngestConfig::default()),
            "/pubsub",
            serde_json::json!({
                "message": {
                    "attributes": {
                        "bucketId": "uploads",
                        "objectId": "configs/acme.xml",
                        "eventType": "OBJECT_FINALIZE"
                    },
                    "data": general_purpose::STANDARD.encode("{}"),
                    "messageId": "1"
                },
                "subscription": "projects/p/subscriptions/shoplift"
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["clientId"], "acme");
    }

    #[tokio::test]
    async fn test_pubsub_raw_name_with_default_bucket() {
        let mut store = MockObjectStore::new();
        store.expect_download_text()
            .withf(|bucket, name| bucket == "uploads" && name == "acme.xml")
            .returning(|_, _| Ok("<config/>".to_string()));
        store.expect_copy_object().returning(|_, _, _| Ok(()));
        store.expect_delete_object().returning(|_, _| Ok(()));
        let mut clients = MockClientStore::new();
        clients.expect_create_client().returning(|_| Ok(()));

        let config = IngestConfig {
            default_bucket: Some("uploads".to_string()),
            ..IngestConfig::default()
        };
        let (status, _) = post_json(
            app(store, clients, config),
            "/pubsub",
            serde_json::json!({"message": {"data": general_purpose::STANDARD.encode("acme.xml")}}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_pubsub_without_object_is_rejected() {
        let (status, body) = post_json(
            app(MockObjectStore::new(), MockClientStore::new(), IngestConfig::default()),
            "/pubsub",
            serde_json::json!({"message": {"attributes": {}}}),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["outcome"], "rejected");
    }

    #[tokio::test]
    async fn test_pubsub_delete_notification_is_skipped() {
        let mut store = MockObjectStore::new();
        store.expect_download_text().never();

        let (status, body) = post_json(
            app(store, MockClientStore::new(), IngestConfig::default()),
            "/pubsub",
            serde_json::json!({
                "message": {
                    "attributes": {
                        "bucketId": "uploads",
                        "objectId": "acme.xml",
                        "eventType": "OBJECT_DELETE"
                    }
                }
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["reason"], "unsupported_event_type");
    }

    #[tokio::test]
    async fn test_healthz() {
        let response = app(MockObjectStore::new(), MockClientStore::new(), IngestConfig::default())
            .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_storage_error_is_displayable() {
        let e = StorageError::NotFound {
            bucket: "uploads".to_string(),
            name: "acme.xml".to_string(),
        };
        assert_eq!(e.to_string(), "Object gs://uploads/acme.xml not found");
    }
}
