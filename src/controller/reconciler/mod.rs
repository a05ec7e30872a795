//! # Reconciler
//!
//! Reconciliation of `Client` resources into their dependent workload set.
//!
//! ## Module Structure
//!
//! - `types.rs` - Error type, operation outcomes and the reconciliation context
//! - `client.rs` - `WorkloadClient` seam over the Kubernetes API
//! - `apply.rs` - Provisioning and refresh of dependents
//! - `cleanup.rs` - Teardown of dependents on deletion
//!
//! Deletion is driven by the `shoplift.example.com/cleanup` finalizer, so a
//! `Client` only disappears after its dependents have been removed.

mod apply;
mod client;
mod cleanup;
mod types;

pub use apply::{apply_client, observe_dependents, pending_status, status_changed};
pub use cleanup::cleanup_client;
pub use client::{KubeWorkloadClient, WorkloadClient};
pub use types::{CreateOutcome, DeleteOutcome, Reconciler, ReconcilerError};

use crate::constants::CLIENT_FINALIZER;
use crate::crd::ClientResource;
use crate::observability::metrics;
use kube::api::Api;
use kube::ResourceExt;
use kube_runtime::controller::Action;
use kube_runtime::finalizer::{finalizer, Event};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, Instrument};
use types::object_key;

/// Entry point handed to the controller runtime
pub async fn reconcile(
    obj: Arc<ClientResource>,
    ctx: Arc<Reconciler>,
) -> Result<Action, ReconcilerError> {
    let start = Instant::now();
    metrics::increment_reconciliations();

    let namespace = obj
        .namespace()
        .ok_or(ReconcilerError::MissingObjectKey(".metadata.namespace"))?;
    let api: Api<ClientResource> = Api::namespaced(ctx.client.clone(), &namespace);

    let span = tracing::info_span!(
        "controller.reconcile",
        resource.name = %obj.name_any(),
        resource.namespace = %namespace,
        resource.generation = obj.metadata.generation.unwrap_or_default()
    );

    let result = finalizer(&api, CLIENT_FINALIZER, obj, |event| async {
        match event {
            Event::Apply(client) => {
                on_apply(
                    &client,
                    ctx.workloads.as_ref(),
                    ctx.config.resync_duration(),
                )
                .await
            }
            Event::Cleanup(client) => on_cleanup(&client, ctx.workloads.as_ref()).await,
        }
    })
    .instrument(span)
    .await
    .map_err(|e| ReconcilerError::Finalizer(Box::new(e)));

    metrics::observe_reconciliation_duration(start.elapsed().as_secs_f64());
    result
}

/// Converge dependents, record status if it moved, then wait for the next resync
async fn on_apply(
    client: &ClientResource,
    workloads: &dyn WorkloadClient,
    resync: Duration,
) -> Result<Action, ReconcilerError> {
    let (namespace, name) = object_key(client)?;
    if client.status.is_none() {
        workloads
            .patch_status(&namespace, &name, pending_status())
            .await?;
        debug!("Client {}/{} pending", namespace, name);
    }

    let status = apply_client(client, workloads).await?;

    if status_changed(client.status.as_ref(), &status) {
        workloads.patch_status(&namespace, &name, status).await?;
        info!("Client {}/{} provisioned", namespace, name);
    } else {
        debug!("Client {}/{} unchanged", namespace, name);
    }

    Ok(Action::requeue(resync))
}

async fn on_cleanup(
    client: &ClientResource,
    workloads: &dyn WorkloadClient,
) -> Result<Action, ReconcilerError> {
    cleanup_client(client, workloads).await?;
    info!(
        "Client {}/{} cleaned up",
        client.namespace().unwrap_or_default(),
        client.name_any()
    );
    Ok(Action::await_change())
}
