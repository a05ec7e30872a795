//! # Ingestion Pipeline
//!
//! Turns one storage event into a created or updated `Client` resource and
//! moves the source object under the processed prefix.
//!
//! Not transactional: if relocation fails after the resource was written, the
//! source object stays put and a redelivered event re-ingests it. Submitting
//! is create-or-update, so that replay is harmless.

use super::cluster::{ClientStore, ClusterError};
use super::event::StorageEvent;
use super::naming::{derive_client_id, is_config_object, is_processed, processed_path};
use crate::config::IngestConfig;
use crate::crd::ClientResource;
use crate::observability::metrics;
use crate::storage::{ObjectStore, StorageError};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, info_span, warn, Instrument};

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Failed to download gs://{bucket}/{name}: {source}")]
    Download {
        bucket: String,
        name: String,
        #[source]
        source: StorageError,
    },

    #[error("Failed to submit Client {client_id}: {source}")]
    Submit {
        client_id: String,
        #[source]
        source: ClusterError,
    },

    #[error("Failed to move gs://{bucket}/{name} to {destination}: {source}")]
    Relocate {
        bucket: String,
        name: String,
        destination: String,
        #[source]
        source: StorageError,
    },
}

/// How the `Client` resource was written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmitAction {
    Created,
    Updated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Name does not carry the configuration suffix
    NotConfigObject,
    /// Object already lives under the processed prefix
    AlreadyProcessed,
    /// Object vanished before it could be read, typically a duplicate delivery
    ObjectMissing,
    /// Notification for something other than a new object generation
    UnsupportedEventType,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SkipReason::NotConfigObject => "not a configuration object",
            SkipReason::AlreadyProcessed => "already processed",
            SkipReason::ObjectMissing => "object no longer exists",
            SkipReason::UnsupportedEventType => "not an object finalize event",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum IngestOutcome {
    Ingested {
        client_id: String,
        action: SubmitAction,
        processed_path: String,
    },
    Skipped {
        reason: SkipReason,
    },
}

impl IngestOutcome {
    pub(crate) fn metric_label(&self) -> &'static str {
        match self {
            IngestOutcome::Ingested { .. } => "ingested",
            IngestOutcome::Skipped { .. } => "skipped",
        }
    }
}

/// Ingestion entry point shared by the HTTP server and the one-shot CLI
pub struct Ingestor {
    store: Arc<dyn ObjectStore>,
    clients: Arc<dyn ClientStore>,
    config: IngestConfig,
}

impl std::fmt::Debug for Ingestor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ingestor")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Ingestor {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        clients: Arc<dyn ClientStore>,
        config: IngestConfig,
    ) -> Self {
        Self {
            store,
            clients,
            config,
        }
    }

    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    /// Handle one storage event end to end
    pub async fn handle(&self, event: &StorageEvent) -> Result<IngestOutcome, IngestError> {
        let span = info_span!("ingest.event", bucket = %event.bucket, object.name = %event.name);
        let result = self.ingest(event).instrument(span).await;

        match &result {
            Ok(outcome) => metrics::increment_ingestion_events(outcome.metric_label()),
            Err(_) => metrics::increment_ingestion_events("failed"),
        }
        result
    }

    async fn ingest(&self, event: &StorageEvent) -> Result<IngestOutcome, IngestError> {
        let StorageEvent { bucket, name } = event;

        if !is_config_object(name, &self.config.config_suffix) {
            info!("Ignoring gs://{}/{}: not a configuration object", bucket, name);
            return Ok(IngestOutcome::Skipped {
                reason: SkipReason::NotConfigObject,
            });
        }

        if self.config.skip_processed && is_processed(name, &self.config.processed_prefix) {
            info!("Ignoring gs://{}/{}: already processed", bucket, name);
            return Ok(IngestOutcome::Skipped {
                reason: SkipReason::AlreadyProcessed,
            });
        }

        let xml_config = match self.store.download_text(bucket, name).await {
            Ok(content) => content,
            Err(e) if e.is_not_found() => {
                warn!("Ignoring gs://{}/{}: object no longer exists", bucket, name);
                return Ok(IngestOutcome::Skipped {
                    reason: SkipReason::ObjectMissing,
                });
            }
            Err(source) => {
                return Err(IngestError::Download {
                    bucket: bucket.clone(),
                    name: name.clone(),
                    source,
                })
            }
        };

        let client_id = derive_client_id(name).to_string();
        let action = self.submit(&client_id, xml_config).await?;
        info!("Client {} {:?} from gs://{}/{}", client_id, action, bucket, name);

        let destination = processed_path(name, &self.config.processed_prefix);
        self.relocate(bucket, name, &destination).await?;
        info!("Moved gs://{}/{} to {}", bucket, name, destination);

        Ok(IngestOutcome::Ingested {
            client_id,
            action,
            processed_path: destination,
        })
    }

    /// Create the resource, falling back to a merge-patch when it already exists
    async fn submit(&self, client_id: &str, xml_config: String) -> Result<SubmitAction, IngestError> {
        let resource = ClientResource::for_ingestion(client_id, xml_config);
        let submit_error = |source| IngestError::Submit {
            client_id: client_id.to_string(),
            source,
        };

        match self.clients.create_client(resource.clone()).await {
            Ok(()) => Ok(SubmitAction::Created),
            Err(ClusterError::AlreadyExists(_)) => {
                self.clients
                    .patch_client(resource)
                    .await
                    .map_err(submit_error)?;
                Ok(SubmitAction::Updated)
            }
            Err(e) => Err(submit_error(e)),
        }
    }

    async fn relocate(&self, bucket: &str, name: &str, destination: &str) -> Result<(), IngestError> {
        let relocate_error = |source| IngestError::Relocate {
            bucket: bucket.to_string(),
            name: name.to_string(),
            destination: destination.to_string(),
            source,
        };

        self.store
            .copy_object(bucket, name, destination)
            .await
            .map_err(relocate_error)?;

        match self.store.delete_object(bucket, name).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_not_found() => {
                warn!("gs://{}/{} was already deleted", bucket, name);
                Ok(())
            }
            Err(e) => Err(relocate_error(e)),
        }
    }
}
