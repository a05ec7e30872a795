//! # Object Operations
//!
//! Implementation of [`ObjectStore`] for the Cloud Storage JSON API.

use super::{GcsREST, ObjectResource};
use crate::observability::metrics;
use crate::storage::{ObjectStore, StorageError};
use async_trait::async_trait;
use reqwest::Method;
use tracing::{debug, info_span, Instrument};

impl GcsREST {
    /// Send a request and turn a non-success status into an error
    async fn execute(
        &self,
        operation: &'static str,
        request: reqwest::RequestBuilder,
        bucket: &str,
        name: &str,
    ) -> Result<reqwest::Response, StorageError> {
        metrics::increment_storage_operations(operation);

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                metrics::increment_storage_operation_errors(operation);
                return Err(e.into());
            }
        };

        if response.status().is_success() {
            return Ok(response);
        }

        metrics::increment_storage_operation_errors(operation);
        let status = response.status();
        let error_text = response.text().await.unwrap_or_default();
        Err(Self::handle_error_response(status, &error_text, bucket, name))
    }
}

/// Strict UTF-8 decode; undecodable bytes are an error, never replaced
fn decode_text(bytes: Vec<u8>, bucket: &str, name: &str) -> Result<String, StorageError> {
    String::from_utf8(bytes).map_err(|source| StorageError::InvalidContent {
        bucket: bucket.to_string(),
        name: name.to_string(),
        source,
    })
}

#[async_trait]
impl ObjectStore for GcsREST {
    async fn download_text(&self, bucket: &str, name: &str) -> Result<String, StorageError> {
        let span = info_span!("gcs.object.download", bucket = bucket, object.name = name);

        async move {
            let url = self.object_url(bucket, name, &[])?;
            let request = self
                .make_request(Method::GET, url)
                .await?
                .query(&[("alt", "media")]);

            let response = self.execute("download", request, bucket, name).await?;
            let content = decode_text(response.bytes().await?.to_vec(), bucket, name)?;
            debug!("Downloaded gs://{}/{} ({} bytes)", bucket, name, content.len());
            Ok(content)
        }
        .instrument(span)
        .await
    }

    async fn copy_object(
        &self,
        bucket: &str,
        source: &str,
        destination: &str,
    ) -> Result<(), StorageError> {
        let span = info_span!(
            "gcs.object.copy",
            bucket = bucket,
            object.name = source,
            object.destination = destination
        );

        async move {
            let url = self.object_url(bucket, source, &["copyTo", "b", bucket, "o", destination])?;
            // An empty metadata body keeps the source object's metadata
            let request = self
                .make_request(Method::POST, url)
                .await?
                .json(&serde_json::json!({}));

            let response = self.execute("copy", request, bucket, source).await?;
            match response.json::<ObjectResource>().await {
                Ok(copied) => debug!(
                    "Copied gs://{}/{} to gs://{}/{} (generation {})",
                    bucket,
                    source,
                    copied.bucket,
                    copied.name,
                    copied.generation.as_deref().unwrap_or("unknown")
                ),
                Err(e) => debug!("Copy succeeded but response was not an object resource: {}", e),
            }
            Ok(())
        }
        .instrument(span)
        .await
    }

    async fn delete_object(&self, bucket: &str, name: &str) -> Result<(), StorageError> {
        let span = info_span!("gcs.object.delete", bucket = bucket, object.name = name);

        async move {
            let url = self.object_url(bucket, name, &[])?;
            let request = self.make_request(Method::DELETE, url).await?;

            self.execute("delete", request, bucket, name).await?;
            debug!("Deleted gs://{}/{}", bucket, name);
            Ok(())
        }
        .instrument(span)
        .await
    }
}
