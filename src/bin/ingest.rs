//! # Shoplift Ingest
//!
//! Storage-triggered ingestion function.
//!
//! ## Usage
//!
//! ```bash
//! # Serve the HTTP trigger endpoint (Cloud Run, Eventarc, Pub/Sub push)
//! shoplift-ingest serve --port 8080
//!
//! # Ingest a single object and print the outcome
//! shoplift-ingest process --bucket uploads --name acme.xml
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use shoplift_operator::config::IngestConfig;
use shoplift_operator::ingest::{server, Ingestor, KubeClientStore, StorageEvent};
use shoplift_operator::observability::{init_tracing, metrics};
use shoplift_operator::storage::GcsREST;
use std::sync::Arc;
use tracing::{info, warn};

/// Shoplift configuration ingestion function
#[derive(Parser)]
#[command(name = "shoplift-ingest", about = "Turns uploaded client configurations into Client resources", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the HTTP trigger endpoint
    Serve {
        /// Listen port (defaults to INGEST_PORT or 8080)
        #[arg(short, long, env = "INGEST_PORT")]
        port: Option<u16>,
    },
    /// Ingest one object and exit
    Process {
        /// Bucket holding the object
        #[arg(short, long)]
        bucket: String,
        /// Object name within the bucket
        #[arg(short, long)]
        name: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let provider_installed = rustls::crypto::ring::default_provider()
        .install_default()
        .is_ok();

    let cli = Cli::parse();
    let config = IngestConfig::from_env();
    init_tracing(config.log_format);
    if !provider_installed {
        warn!("rustls crypto provider was already installed");
    }
    metrics::register_metrics()?;

    let client = kube::Client::try_default()
        .await
        .context("Failed to create Kubernetes client")?;
    let clients = Arc::new(KubeClientStore::new(client, &config.client_namespace));
    let store = Arc::new(GcsREST::new().context("Failed to create Cloud Storage client")?);
    let port = config.port;
    let ingestor = Arc::new(Ingestor::new(store, clients, config));

    match cli.command {
        Commands::Serve { port: override_port } => {
            server::serve(override_port.unwrap_or(port), ingestor).await
        }
        Commands::Process { bucket, name } => {
            info!("Processing gs://{}/{}", bucket, name);
            let outcome = ingestor
                .handle(&StorageEvent { bucket, name })
                .await
                .context("Ingestion failed")?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
            Ok(())
        }
    }
}
