//! # Object Storage
//!
//! Abstraction over the bucket the ingestion function reads uploads from.
//!
//! - `gcs`: Cloud Storage JSON API client over `reqwest`

pub mod gcs;

pub use gcs::GcsREST;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Object gs://{bucket}/{name} not found")]
    NotFound { bucket: String, name: String },

    #[error("Storage API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Storage request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to obtain storage access token: {0}")]
    Auth(String),

    #[error("Invalid storage endpoint {0}")]
    InvalidEndpoint(String),

    #[error("Object gs://{bucket}/{name} is not valid UTF-8 text: {source}")]
    InvalidContent {
        bucket: String,
        name: String,
        #[source]
        source: std::string::FromUtf8Error,
    },
}

impl StorageError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound { .. })
    }
}

/// Operations the ingestion pipeline needs from a bucket
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Download the full content of an object as text
    async fn download_text(&self, bucket: &str, name: &str) -> Result<String, StorageError>;

    /// Server-side copy of `source` to `destination` within `bucket`
    async fn copy_object(
        &self,
        bucket: &str,
        source: &str,
        destination: &str,
    ) -> Result<(), StorageError>;

    async fn delete_object(&self, bucket: &str, name: &str) -> Result<(), StorageError>;
}
