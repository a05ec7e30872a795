//! # Cluster Client
//!
//! Writes `Client` resources on behalf of the ingestion function.

use crate::crd::ClientResource;
use async_trait::async_trait;
use kube::api::{Api, Patch, PatchParams, PostParams};
use kube::Client;
#[cfg(test)]
use mockall::automock;
use thiserror::Error;
use tracing::{info_span, Instrument};

#[derive(Debug, Error)]
pub enum ClusterError {
    #[error("Client {0} already exists")]
    AlreadyExists(String),

    #[error("Kubernetes API error: {0}")]
    Kube(#[from] kube::Error),

    #[error("Failed to serialize Client: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait ClientStore: Send + Sync {
    /// Create the resource; a name conflict is returned as [`ClusterError::AlreadyExists`]
    async fn create_client(&self, client: ClientResource) -> Result<(), ClusterError>;

    /// Merge-patch an existing resource of the same name
    async fn patch_client(&self, client: ClientResource) -> Result<(), ClusterError>;
}

/// [`ClientStore`] over `kube::Api<Client>` in a fixed namespace
#[derive(Clone)]
pub struct KubeClientStore {
    api: Api<ClientResource>,
    namespace: String,
}

impl std::fmt::Debug for KubeClientStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeClientStore")
            .field("namespace", &self.namespace)
            .finish_non_exhaustive()
    }
}

impl KubeClientStore {
    pub fn new(client: Client, namespace: &str) -> Self {
        Self {
            api: Api::namespaced(client, namespace),
            namespace: namespace.to_string(),
        }
    }
}

fn client_name(client: &ClientResource) -> String {
    client.metadata.name.clone().unwrap_or_default()
}

#[async_trait]
impl ClientStore for KubeClientStore {
    async fn create_client(&self, client: ClientResource) -> Result<(), ClusterError> {
        let name = client_name(&client);
        let span = info_span!("kubernetes.client.create", resource.name = %name, resource.namespace = %self.namespace);

        async move {
            match self.api.create(&PostParams::default(), &client).await {
                Ok(_) => Ok(()),
                Err(kube::Error::Api(e)) if e.code == 409 => Err(ClusterError::AlreadyExists(name)),
                Err(e) => Err(e.into()),
            }
        }
        .instrument(span)
        .await
    }

    async fn patch_client(&self, client: ClientResource) -> Result<(), ClusterError> {
        let name = client_name(&client);
        let span = info_span!("kubernetes.client.patch", resource.name = %name, resource.namespace = %self.namespace);

        async move {
            let patch = serde_json::to_value(&client)?;
            self.api
                .patch(&name, &PatchParams::default(), &Patch::Merge(patch))
                .await?;
            Ok(())
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{respond, respond_with_status, stub_client};
    use http::Method;

    const CLIENTS_PATH: &str = "/apis/shoplift.example.com/v1/namespaces/default/clients";

    fn acme() -> ClientResource {
        ClientResource::for_ingestion("acme", "<config/>".to_string())
    }

    #[tokio::test]
    async fn test_create_conflict_is_already_exists() {
        let (client, mut server) = stub_client();
        let store = KubeClientStore::new(client, "default");

        let (result, request) = tokio::join!(
            store.create_client(acme()),
            respond_with_status(&mut server, 409, "AlreadyExists"),
        );

        match result {
            Err(ClusterError::AlreadyExists(name)) => assert_eq!(name, "acme"),
            other => panic!("expected AlreadyExists, got {other:?}"),
        }
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.path, CLIENTS_PATH);
    }

    #[tokio::test]
    async fn test_create_success() {
        let (client, mut server) = stub_client();
        let store = KubeClientStore::new(client, "default");
        let body = serde_json::to_value(acme()).unwrap();

        let (result, _) = tokio::join!(store.create_client(acme()), respond(&mut server, 201, body));

        assert!(result.is_ok(), "create failed: {result:?}");
    }

    #[tokio::test]
    async fn test_other_create_failures_are_raised() {
        let (client, mut server) = stub_client();
        let store = KubeClientStore::new(client, "default");

        let (result, _) = tokio::join!(
            store.create_client(acme()),
            respond_with_status(&mut server, 422, "Invalid"),
        );

        assert!(matches!(result, Err(ClusterError::Kube(_))));
    }

    #[tokio::test]
    async fn test_patch_targets_named_client() {
        let (client, mut server) = stub_client();
        let store = KubeClientStore::new(client, "default");
        let body = serde_json::to_value(acme()).unwrap();

        let (result, request) = tokio::join!(store.patch_client(acme()), respond(&mut server, 200, body));

        assert!(result.is_ok(), "patch failed: {result:?}");
        assert_eq!(request.method, Method::PATCH);
        assert_eq!(request.path, format!("{CLIENTS_PATH}/acme"));
    }
}
