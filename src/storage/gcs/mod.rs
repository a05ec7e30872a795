//! Cloud Storage REST Client
//!
//! Native REST implementation of the subset of the Cloud Storage JSON API v1
//! the ingestion function uses. Uses reqwest with rustls and a bearer token
//! from the GCE metadata server (Workload Identity).
//!
//! When `PACT_MODE` is set, requests go to `GCS_ENDPOINT` with a dummy token
//! so the client can run against a Pact mock server.
//!
//! References:
//! - [Cloud Storage JSON API v1](https://cloud.google.com/storage/docs/json_api/v1)

mod operations;
mod responses;

pub use responses::*;

use super::StorageError;
use crate::constants::{DEFAULT_GCS_ENDPOINT, METADATA_TOKEN_URL};
use reqwest::{Client, Method, Url};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Refresh the cached token this long before the metadata server says it expires
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: Option<Instant>,
}

impl CachedToken {
    fn is_fresh(&self) -> bool {
        self.expires_at
            .is_none_or(|at| Instant::now() + TOKEN_EXPIRY_MARGIN < at)
    }
}

/// Cloud Storage REST client
pub struct GcsREST {
    http_client: Client,
    base_url: Url,
    token: Mutex<Option<CachedToken>>,
}

impl std::fmt::Debug for GcsREST {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GcsREST")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl GcsREST {
    /// Create a client for the production endpoint, or for `GCS_ENDPOINT` in
    /// Pact mode
    pub fn new() -> Result<Self, StorageError> {
        let pact_mode = std::env::var("PACT_MODE").is_ok();
        let endpoint = if pact_mode {
            std::env::var("GCS_ENDPOINT").unwrap_or_else(|_| DEFAULT_GCS_ENDPOINT.to_string())
        } else {
            DEFAULT_GCS_ENDPOINT.to_string()
        };

        info!("Initializing Cloud Storage REST client for {}", endpoint);
        if pact_mode {
            info!("Pact mode enabled: using endpoint {}", endpoint);
        }

        Self::with_endpoint(&endpoint)
    }

    /// Create a client for an explicit endpoint
    pub fn with_endpoint(endpoint: &str) -> Result<Self, StorageError> {
        let base_url = Url::parse(endpoint)
            .map_err(|e| StorageError::InvalidEndpoint(format!("{endpoint}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(StorageError::InvalidEndpoint(endpoint.to_string()));
        }

        let http_client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;

        Ok(Self {
            http_client,
            base_url,
            token: Mutex::new(None),
        })
    }

    /// Bearer token for API calls, fetched from the metadata server and cached
    /// until shortly before it expires
    pub(crate) async fn access_token(&self) -> Result<String, StorageError> {
        if std::env::var("PACT_MODE").is_ok() {
            debug!("Pact mode: using dummy access token");
            return Ok("test-token".to_string());
        }

        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref().filter(|t| t.is_fresh()) {
            return Ok(token.value.clone());
        }

        let response = self
            .http_client
            .get(METADATA_TOKEN_URL)
            .header("Metadata-Flavor", "Google")
            .send()
            .await
            .map_err(|e| StorageError::Auth(format!("metadata server not available: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::Auth(format!(
                "metadata server returned {status}: {body}"
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| StorageError::Auth(format!("invalid token response: {e}")))?;
        debug!("Retrieved access token from metadata server (Workload Identity)");

        let value = token.access_token.clone();
        *cached = Some(CachedToken {
            value: token.access_token,
            expires_at: Instant::now().checked_add(Duration::from_secs(token.expires_in)),
        });
        Ok(value)
    }

    /// `{base}/storage/v1/b/{bucket}/o/{object}` followed by `suffix` segments.
    ///
    /// Each segment is percent-encoded on its own, so `/` inside an object
    /// name becomes `%2F`.
    pub(crate) fn object_url(
        &self,
        bucket: &str,
        object: &str,
        suffix: &[&str],
    ) -> Result<Url, StorageError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| StorageError::InvalidEndpoint(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(["storage", "v1", "b", bucket, "o", object])
            .extend(suffix);
        Ok(url)
    }

    /// Build an authenticated request
    pub(crate) async fn make_request(
        &self,
        method: Method,
        url: Url,
    ) -> Result<reqwest::RequestBuilder, StorageError> {
        let token = self.access_token().await?;
        Ok(self.http_client.request(method, url).bearer_auth(token))
    }

    /// Turn a non-success response into a [`StorageError`]
    pub(crate) fn handle_error_response(
        status: reqwest::StatusCode,
        error_text: &str,
        bucket: &str,
        name: &str,
    ) -> StorageError {
        if status == reqwest::StatusCode::NOT_FOUND {
            return StorageError::NotFound {
                bucket: bucket.to_string(),
                name: name.to_string(),
            };
        }

        let message = serde_json::from_str::<GcsErrorResponse>(error_text)
            .map(|r| r.error.message)
            .unwrap_or_else(|_| error_text.to_string());

        StorageError::Api {
            status: status.as_u16(),
            message,
        }
    }
}
