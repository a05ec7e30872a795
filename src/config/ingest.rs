//! # Ingestion Configuration
//!
//! Settings for the storage-triggered ingestion function.

use super::{env_var_opt, env_var_or_default, env_var_or_default_bool, env_var_or_default_str};
use crate::config::LogFormat;
use crate::constants::{
    DEFAULT_CLIENT_NAMESPACE, DEFAULT_CONFIG_SUFFIX, DEFAULT_INGEST_PORT, DEFAULT_PROCESSED_PREFIX,
};

#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// Port the HTTP trigger endpoint listens on
    pub port: u16,
    /// Namespace `Client` resources are created in
    pub client_namespace: String,
    /// Object name suffix that marks a client configuration upload
    pub config_suffix: String,
    /// Prefix ingested objects are relocated under
    pub processed_prefix: String,
    /// Ignore events for objects already under `processed_prefix`
    pub skip_processed: bool,
    /// Bucket used when a Pub/Sub message only carries an object name
    pub default_bucket: Option<String>,
    pub log_format: LogFormat,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_INGEST_PORT,
            client_namespace: DEFAULT_CLIENT_NAMESPACE.to_string(),
            config_suffix: DEFAULT_CONFIG_SUFFIX.to_string(),
            processed_prefix: DEFAULT_PROCESSED_PREFIX.to_string(),
            skip_processed: true,
            default_bucket: None,
            log_format: LogFormat::Text,
        }
    }
}

impl IngestConfig {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        let mut processed_prefix =
            env_var_or_default_str("PROCESSED_PREFIX", DEFAULT_PROCESSED_PREFIX);
        if !processed_prefix.ends_with('/') {
            processed_prefix.push('/');
        }

        Self {
            port: env_var_or_default("INGEST_PORT", DEFAULT_INGEST_PORT),
            client_namespace: env_var_or_default_str("CLIENT_NAMESPACE", DEFAULT_CLIENT_NAMESPACE),
            config_suffix: env_var_or_default_str("CONFIG_SUFFIX", DEFAULT_CONFIG_SUFFIX),
            processed_prefix,
            skip_processed: env_var_or_default_bool("INGEST_SKIP_PROCESSED", true),
            default_bucket: env_var_opt("INGEST_DEFAULT_BUCKET"),
            log_format: LogFormat::from_env_value(&env_var_or_default_str("LOG_FORMAT", "text")),
        }
    }
}
