//! # Apply
//!
//! Converges the dependent workload set of a live `Client`.
//!
//! The per-kind [`DependentState`] is read from the API server on every pass:
//! - all Absent: provision everything in [`DependentKind::PROVISION_ORDER`]
//! - generation changed: refresh ConfigMap data and the Deployment image,
//!   provisioning anything that went missing
//! - generation already observed, all Provisioned: no writes

use super::client::WorkloadClient;
use super::types::{object_key, CreateOutcome, ReconcilerError};
use crate::controller::resources::{config_data, image_patch, DependentKind, DependentObject};
use crate::crd::{ClientPhase, ClientResource, ClientStatus, DependentState, DependentStates};
use crate::observability::metrics;
use tracing::{debug, info};

fn state_slot(states: &mut DependentStates, kind: DependentKind) -> &mut DependentState {
    match kind {
        DependentKind::ConfigMap => &mut states.config_map,
        DependentKind::Deployment => &mut states.deployment,
        DependentKind::Service => &mut states.service,
        DependentKind::HorizontalPodAutoscaler => &mut states.autoscaler,
    }
}

/// Read the current existence of every dependent
pub async fn observe_dependents(
    workloads: &dyn WorkloadClient,
    namespace: &str,
    name: &str,
) -> Result<DependentStates, ReconcilerError> {
    let mut states = DependentStates::default();
    for kind in DependentKind::PROVISION_ORDER {
        if workloads
            .exists(namespace, kind, &kind.object_name(name))
            .await?
        {
            *state_slot(&mut states, kind) = DependentState::Provisioned;
        }
    }
    Ok(states)
}

/// Bring the dependents of `client` in line with its spec and return the
/// status describing the result
pub async fn apply_client(
    client: &ClientResource,
    workloads: &dyn WorkloadClient,
) -> Result<ClientStatus, ReconcilerError> {
    let (namespace, name) = object_key(client)?;
    let generation = client.metadata.generation;
    let observed_generation = client
        .status
        .as_ref()
        .and_then(|s| s.observed_generation);

    let before = observe_dependents(workloads, &namespace, &name).await?;
    let mut after = before;

    for kind in DependentKind::PROVISION_ORDER {
        if state_slot(&mut after, kind).is_provisioned() {
            continue;
        }
        let object = DependentObject::build(kind, client);
        let object_name = object.name();
        match workloads.create(&namespace, object).await? {
            CreateOutcome::Created => {
                info!("Created {} {}/{}", kind, namespace, object_name);
                metrics::record_dependent_operation(kind.as_str(), "create");
            }
            CreateOutcome::AlreadyExists => {
                debug!(
                    "{} {}/{} already exists, treating as provisioned",
                    kind, namespace, object_name
                );
            }
        }
        *state_slot(&mut after, kind) = DependentState::Provisioned;
    }

    // Objects created on this pass already carry the current spec
    if generation != observed_generation {
        if before.config_map.is_provisioned() {
            let cm_name = DependentKind::ConfigMap.object_name(&name);
            workloads
                .replace_config_data(&namespace, &cm_name, config_data(&client.spec.xml_config))
                .await?;
            info!("Refreshed ConfigMap {}/{}", namespace, cm_name);
            metrics::record_dependent_operation(DependentKind::ConfigMap.as_str(), "replace");
        }
        if before.deployment.is_provisioned() {
            workloads
                .patch_deployment(&namespace, &name, image_patch())
                .await?;
            info!("Refreshed Deployment {}/{} image", namespace, name);
            metrics::record_dependent_operation(DependentKind::Deployment.as_str(), "patch");
        }
    }

    let phase = if after.all_provisioned() {
        ClientPhase::Provisioned
    } else {
        ClientPhase::Pending
    };

    Ok(ClientStatus {
        phase: Some(phase),
        observed_generation: generation,
        last_reconcile_time: Some(chrono::Utc::now().to_rfc3339()),
        dependents: Some(after),
    })
}

/// Status recorded the first time a `Client` is seen, before any dependent
/// has been created
pub fn pending_status() -> ClientStatus {
    ClientStatus {
        phase: Some(ClientPhase::Pending),
        observed_generation: None,
        last_reconcile_time: Some(chrono::Utc::now().to_rfc3339()),
        dependents: Some(DependentStates::default()),
    }
}

/// Whether `next` differs from `current` in anything but the timestamp
pub fn status_changed(current: Option<&ClientStatus>, next: &ClientStatus) -> bool {
    match current {
        None => true,
        Some(current) => {
            current.phase != next.phase
                || current.observed_generation != next.observed_generation
                || current.dependents != next.dependents
        }
    }
}
