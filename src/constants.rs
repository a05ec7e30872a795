//! # Constants
//!
//! Shared constants used throughout the operator and the ingestion function.
//!
//! Workload parameters are fixed: they are not derived from the `Client`
//! resource and can only change with a new operator release.

/// API group of the `Client` custom resource
pub const CLIENT_GROUP: &str = "shoplift.example.com";

/// API version served and watched for `Client` resources
pub const CLIENT_VERSION: &str = "v1";

/// Finalizer placed on `Client` resources so deletion tears down dependents
pub const CLIENT_FINALIZER: &str = "shoplift.example.com/cleanup";

/// Field manager used for status patches
pub const FIELD_MANAGER: &str = "shoplift-operator";

/// Container image run by every provisioned deployment
pub const DETECTOR_IMAGE: &str = "your-registry/shoplifting-detector:latest";

/// Name of the single container in the deployment's pod template
pub const DETECTOR_CONTAINER_NAME: &str = "shoplifting-detector";

/// Key under which the configuration payload is stored in the ConfigMap
pub const CONFIG_DATA_KEY: &str = "config.xml";

/// Pod volume name backing the ConfigMap mount
pub const CONFIG_VOLUME_NAME: &str = "config";

/// Mount path of the configuration volume inside the container
pub const CONFIG_MOUNT_PATH: &str = "/app/config";

pub const CPU_REQUEST: &str = "100m";
pub const MEMORY_REQUEST: &str = "128Mi";
pub const CPU_LIMIT: &str = "500m";
pub const MEMORY_LIMIT: &str = "512Mi";

/// Port exposed by the Service
pub const SERVICE_PORT: i32 = 80;

/// Container port the Service forwards to
pub const SERVICE_TARGET_PORT: i32 = 8080;

pub const HPA_MIN_REPLICAS: i32 = 1;
pub const HPA_MAX_REPLICAS: i32 = 10;

/// Target average CPU utilization (percent) for the autoscaler
pub const HPA_TARGET_CPU_UTILIZATION: i32 = 50;

/// Replica count the deployment is seeded with before the autoscaler takes over
pub const INITIAL_REPLICAS: i32 = 1;

/// Suffix appended to the client name for the ConfigMap
pub const CONFIG_MAP_SUFFIX: &str = "-config";

/// Suffix appended to the client name for the HorizontalPodAutoscaler
pub const HPA_SUFFIX: &str = "-hpa";

/// Default object name suffix that marks an upload as a client configuration
pub const DEFAULT_CONFIG_SUFFIX: &str = ".xml";

/// Default prefix ingested objects are moved under
pub const DEFAULT_PROCESSED_PREFIX: &str = "processed/";

/// Default namespace `Client` resources are written to by ingestion
pub const DEFAULT_CLIENT_NAMESPACE: &str = "default";

/// Default HTTP server port for metrics and health probes
pub const DEFAULT_METRICS_PORT: u16 = 8080;

/// Default HTTP port the ingestion function listens on
pub const DEFAULT_INGEST_PORT: u16 = 8080;

/// Default requeue interval for reconciliation errors (seconds)
pub const DEFAULT_RECONCILIATION_ERROR_REQUEUE_SECS: u64 = 60;

/// Default resync interval after a successful reconciliation (seconds)
pub const DEFAULT_RESYNC_INTERVAL_SECS: u64 = 300;

/// Default Cloud Storage JSON API endpoint
pub const DEFAULT_GCS_ENDPOINT: &str = "https://storage.googleapis.com";

/// GCE metadata server token endpoint (Workload Identity)
pub const METADATA_TOKEN_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";
