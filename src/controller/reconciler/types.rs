//! # Types
//!
//! Core types for the reconciler.

use super::client::WorkloadClient;
use crate::config::ControllerConfig;
use crate::crd::ClientResource;
use kube::Client;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReconcilerError {
    #[error("Kubernetes API error: {0}")]
    Kube(#[from] kube::Error),

    #[error("Client resource is missing {0}")]
    MissingObjectKey(&'static str),

    #[error("Finalizer error: {0}")]
    Finalizer(#[source] Box<kube_runtime::finalizer::Error<ReconcilerError>>),
}

/// Result of submitting a dependent object for creation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOutcome {
    Created,
    /// The API server answered 409: an object with that name is already there
    AlreadyExists,
}

/// Result of deleting a dependent object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// The API server answered 404
    AlreadyAbsent,
}

/// Shared reconciliation context handed to every reconcile call
#[derive(Clone)]
pub struct Reconciler {
    /// Used for the `Client` API itself (finalizer bookkeeping)
    pub client: Client,
    /// Dependent object and status writes
    pub workloads: Arc<dyn WorkloadClient>,
    pub config: ControllerConfig,
}

impl Reconciler {
    pub fn new(client: Client, workloads: Arc<dyn WorkloadClient>, config: ControllerConfig) -> Self {
        Self {
            client,
            workloads,
            config,
        }
    }
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// `(namespace, name)` of a stored `Client`
pub(crate) fn object_key(client: &ClientResource) -> Result<(String, String), ReconcilerError> {
    let namespace = client
        .metadata
        .namespace
        .clone()
        .ok_or(ReconcilerError::MissingObjectKey(".metadata.namespace"))?;
    let name = client
        .metadata
        .name
        .clone()
        .ok_or(ReconcilerError::MissingObjectKey(".metadata.name"))?;
    Ok((namespace, name))
}
