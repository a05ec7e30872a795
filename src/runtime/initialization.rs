//! # Initialization
//!
//! Operator start-up: rustls, tracing, metrics, the probe server, the
//! Kubernetes client and the reconciliation context.

use crate::config::ControllerConfig;
use crate::controller::reconciler::{KubeWorkloadClient, Reconciler};
use crate::crd::ClientResource;
use crate::observability::{init_tracing, metrics};
use crate::server::{start_server, ServerState};
use anyhow::{Context, Result};
use kube::{api::Api, Client};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

const SERVER_STARTUP_TIMEOUT: Duration = Duration::from_secs(10);

/// Everything the watch loop needs
pub struct InitializationResult {
    pub client: Client,
    /// `Client` resources in the watched scope
    pub clients: Api<ClientResource>,
    pub reconciler: Arc<Reconciler>,
    pub server_state: Arc<ServerState>,
    pub config: ControllerConfig,
}

impl std::fmt::Debug for InitializationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InitializationResult")
            .field("config", &self.config)
            .field(
                "server_ready",
                &self.server_state.is_ready.load(Ordering::Relaxed),
            )
            .finish_non_exhaustive()
    }
}

/// Initialize the operator runtime
pub async fn initialize() -> Result<InitializationResult> {
    // kube uses rustls; the provider must be chosen before any client is built
    let provider_installed = rustls::crypto::ring::default_provider()
        .install_default()
        .is_ok();

    let config = ControllerConfig::from_env();
    init_tracing(config.log_format);
    if !provider_installed {
        warn!("rustls crypto provider was already installed");
    }

    info!("Starting Shoplift Operator");
    info!(
        "Build info: timestamp={}, datetime={}, git_hash={}",
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_DATETIME"),
        env!("BUILD_GIT_HASH")
    );

    metrics::register_metrics()?;

    let server_state = Arc::new(ServerState::default());
    let server_state_clone = Arc::clone(&server_state);
    let server_port = config.metrics_port;
    tokio::spawn(async move {
        if let Err(e) = start_server(server_port, server_state_clone).await {
            error!("HTTP server error: {}", e);
        }
    });
    wait_for_server(&server_state).await?;

    let client = Client::try_default()
        .await
        .context("Failed to create Kubernetes client")?;

    let clients: Api<ClientResource> = match config.watch_namespace.as_deref() {
        Some(namespace) => {
            info!("Watching Client resources in namespace {}", namespace);
            Api::namespaced(client.clone(), namespace)
        }
        None => {
            info!("Watching Client resources in all namespaces");
            Api::all(client.clone())
        }
    };

    let workloads = Arc::new(KubeWorkloadClient::new(client.clone()));
    let reconciler = Arc::new(Reconciler::new(client.clone(), workloads, config.clone()));

    Ok(InitializationResult {
        client,
        clients,
        reconciler,
        server_state,
        config,
    })
}

async fn wait_for_server(state: &ServerState) -> Result<()> {
    tokio::time::timeout(SERVER_STARTUP_TIMEOUT, async {
        while !state.is_listening.load(Ordering::Relaxed) {
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    })
    .await
    .context("HTTP server did not start listening in time")?;
    info!("HTTP server is ready");
    Ok(())
}
