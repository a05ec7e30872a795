//! # Cleanup
//!
//! Tears down the dependent workload set when a `Client` is deleted.

use super::client::WorkloadClient;
use super::types::{object_key, DeleteOutcome, ReconcilerError};
use crate::controller::resources::DependentKind;
use crate::crd::{ClientPhase, ClientResource, ClientStatus};
use crate::observability::metrics;
use tracing::{debug, info, warn};

/// Delete every dependent by derived name. Missing objects count as deleted,
/// so cleaning up a set that was never provisioned succeeds.
pub async fn cleanup_client(
    client: &ClientResource,
    workloads: &dyn WorkloadClient,
) -> Result<(), ReconcilerError> {
    let (namespace, name) = object_key(client)?;

    let terminating = ClientStatus {
        phase: Some(ClientPhase::Terminating),
        observed_generation: client.metadata.generation,
        last_reconcile_time: Some(chrono::Utc::now().to_rfc3339()),
        dependents: client.status.as_ref().and_then(|s| s.dependents),
    };
    if let Err(e) = workloads.patch_status(&namespace, &name, terminating).await {
        warn!(
            "Failed to mark Client {}/{} as terminating: {}",
            namespace, name, e
        );
    }

    for kind in DependentKind::TEARDOWN_ORDER {
        let object_name = kind.object_name(&name);
        match workloads.delete(&namespace, kind, &object_name).await? {
            DeleteOutcome::Deleted => {
                info!("Deleted {} {}/{}", kind, namespace, object_name);
                metrics::record_dependent_operation(kind.as_str(), "delete");
            }
            DeleteOutcome::AlreadyAbsent => {
                debug!("{} {}/{} already absent", kind, namespace, object_name);
            }
        }
    }

    Ok(())
}
