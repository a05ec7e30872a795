//! # Shoplift Operator
//!
//! Kubernetes controller that turns each `Client` resource into a running
//! shoplifting-detector workload.
//!
//! ## Overview
//!
//! For every `Client` the controller maintains:
//!
//! 1. **ConfigMap** `<name>-config` - the client's XML configuration as `config.xml`
//! 2. **Deployment** `<name>` - the detector container with the config mounted read-only
//! 3. **Service** `<name>` - port 80 in front of the detector's 8080
//! 4. **HorizontalPodAutoscaler** `<name>-hpa` - 1 to 10 replicas at 50% CPU
//!
//! Dependents are owned by the `Client`; deletion runs through a finalizer
//! that removes them before the `Client` goes away.
//!
//! ## Configuration
//!
//! See [`ControllerConfig`] for the environment variables read at startup.

use anyhow::Result;
use futures::StreamExt;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::autoscaling::v2::HorizontalPodAutoscaler;
use k8s_openapi::api::core::v1::{ConfigMap, Service};
use kube::{api::Api, Client};
use kube_runtime::{controller, watcher, Controller};
use shoplift_operator::config::ControllerConfig;
use shoplift_operator::controller::reconciler::reconcile;
use shoplift_operator::runtime::{handle_reconciliation_error, initialize};
use std::sync::atomic::Ordering;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let init = initialize().await?;
    let config = init.config;

    init.server_state.is_ready.store(true, Ordering::Relaxed);

    Controller::new(init.clients, watcher::Config::default())
        .owns(owned_api::<ConfigMap>(&init.client, &config), watcher::Config::default())
        .owns(owned_api::<Deployment>(&init.client, &config), watcher::Config::default())
        .owns(owned_api::<Service>(&init.client, &config), watcher::Config::default())
        .owns(
            owned_api::<HorizontalPodAutoscaler>(&init.client, &config),
            watcher::Config::default(),
        )
        .with_config(controller::Config::default().concurrency(config.max_concurrent_reconciliations))
        .shutdown_on_signal()
        .run(reconcile, handle_reconciliation_error, init.reconciler)
        .for_each(|result| {
            if let Err(e) = result {
                warn!("Controller event: {}", e);
            }
            std::future::ready(())
        })
        .await;

    info!("Controller stopped");
    Ok(())
}

/// Dependents are watched in the same scope as the `Client` resources
fn owned_api<K>(client: &Client, config: &ControllerConfig) -> Api<K>
where
    K: kube::Resource<Scope = k8s_openapi::NamespaceResourceScope>,
    <K as kube::Resource>::DynamicType: Default,
{
    match config.watch_namespace.as_deref() {
        Some(namespace) => Api::namespaced(client.clone(), namespace),
        None => Api::all(client.clone()),
    }
}
