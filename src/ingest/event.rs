//! # Trigger Events
//!
//! Payloads that announce a new or changed object:
//! - a Cloud Storage object event (`{"bucket": ..., "name": ...}`, extra fields ignored)
//! - a Pub/Sub push envelope wrapping a Cloud Storage notification

use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Event type Cloud Storage notifications use for a new object or a new generation
pub const OBJECT_FINALIZE: &str = "OBJECT_FINALIZE";

/// A new or changed object
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct StorageEvent {
    pub bucket: String,
    pub name: String,
}

/// Pub/Sub push subscription request body
#[derive(Debug, Clone, Deserialize)]
pub struct PubSubPushEnvelope {
    pub message: PubSubMessage,
    #[serde(default)]
    pub subscription: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PubSubMessage {
    /// Base64-encoded payload
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default)]
    pub attributes: HashMap<String, String>,
    #[serde(default)]
    pub message_id: Option<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EventError {
    #[error("message data is not valid base64: {0}")]
    InvalidBase64(String),

    #[error("message data is not valid UTF-8")]
    InvalidUtf8,

    #[error("message carries no object name")]
    MissingObjectName,

    #[error("message names object {0} but carries no bucket and no default bucket is configured")]
    MissingBucket(String),
}

impl PubSubMessage {
    /// `eventType` attribute of a Cloud Storage notification, if present
    pub fn event_type(&self) -> Option<&str> {
        self.attributes.get("eventType").map(String::as_str)
    }

    /// Resolve the object this message refers to.
    ///
    /// Tried in order: notification attributes, JSON object resource in
    /// `data`, raw object name in `data` paired with `default_bucket`.
    pub fn storage_event(&self, default_bucket: Option<&str>) -> Result<StorageEvent, EventError> {
        if let (Some(bucket), Some(name)) = (
            self.attributes.get("bucketId"),
            self.attributes.get("objectId"),
        ) {
            return Ok(StorageEvent {
                bucket: bucket.clone(),
                name: name.clone(),
            });
        }

        let data = self
            .data
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .ok_or(EventError::MissingObjectName)?;
        let decoded = general_purpose::STANDARD
            .decode(data.trim())
            .map_err(|e| EventError::InvalidBase64(e.to_string()))?;
        let text = String::from_utf8(decoded).map_err(|_| EventError::InvalidUtf8)?;

        if let Ok(event) = serde_json::from_str::<StorageEvent>(&text) {
            return Ok(event);
        }

        let name = text.trim();
        if name.is_empty() {
            return Err(EventError::MissingObjectName);
        }
        match default_bucket {
            Some(bucket) => Ok(StorageEvent {
                bucket: bucket.to_string(),
                name: name.to_string(),
            }),
            None => Err(EventError::MissingBucket(name.to_string())),
        }
    }
}
