//! # Shoplift Operator
//!
//! Provisions one shoplifting-detector workload per client.
//!
//! Two processes share this library:
//!
//! 1. **Ingestion function** (`shoplift-ingest`) - reacts to configuration
//!    uploads in a Cloud Storage bucket and records each as a `Client` resource
//! 2. **Reconciliation controller** (`shoplift-operator`) - watches `Client`
//!    resources and maintains a ConfigMap, Deployment, Service and
//!    HorizontalPodAutoscaler for each
//!
//! The `Client` resource in the cluster is the only hand-off between them.

pub mod config;
pub mod constants;
pub mod controller;
pub mod crd;
pub mod ingest;
pub mod observability;
pub mod runtime;
pub mod server;
pub mod storage;

#[cfg(test)]
pub(crate) mod testing;
