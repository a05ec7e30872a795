//! # Ingestion Function
//!
//! Storage-triggered half of the pipeline: a configuration upload becomes a
//! `Client` resource and the upload is moved under the processed prefix.
//!
//! - `event`: trigger payloads (storage events and Pub/Sub push envelopes)
//! - `naming`: object name rules and client id derivation
//! - `cluster`: `ClientStore` seam over the Kubernetes API
//! - `pipeline`: the ingestion flow itself
//! - `server`: HTTP trigger endpoint

pub mod cluster;
pub mod event;
pub mod naming;
pub mod pipeline;
pub mod server;

pub use cluster::{ClientStore, ClusterError, KubeClientStore};
pub use event::StorageEvent;
pub use pipeline::{IngestError, IngestOutcome, Ingestor};
