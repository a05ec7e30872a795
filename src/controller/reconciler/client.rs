//! # Workload Client
//!
//! The seam between reconciliation logic and the Kubernetes API. The
//! reconciler only ever talks to dependents through [`WorkloadClient`], so the
//! provisioning rules can be tested against a mock.

use super::types::{CreateOutcome, DeleteOutcome, ReconcilerError};
use crate::constants::FIELD_MANAGER;
use crate::controller::resources::{DependentKind, DependentObject};
use crate::crd::{ClientResource, ClientStatus};
use async_trait::async_trait;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::autoscaling::v2::HorizontalPodAutoscaler;
use k8s_openapi::api::core::v1::{ConfigMap, Service};
use k8s_openapi::NamespaceResourceScope;
use kube::api::{Api, DeleteParams, Patch, PatchParams, PostParams};
use kube::{Client, Resource};
#[cfg(test)]
use mockall::automock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Debug;
use tracing::{debug, Instrument};

#[cfg_attr(test, automock)]
#[async_trait]
pub trait WorkloadClient: Send + Sync {
    /// Whether the dependent currently exists on the API server
    async fn exists(
        &self,
        namespace: &str,
        kind: DependentKind,
        name: &str,
    ) -> Result<bool, ReconcilerError>;

    /// Create a dependent. A name conflict is reported, not raised.
    async fn create(
        &self,
        namespace: &str,
        object: DependentObject,
    ) -> Result<CreateOutcome, ReconcilerError>;

    /// Replace the whole `data` map of a ConfigMap
    async fn replace_config_data(
        &self,
        namespace: &str,
        name: &str,
        data: BTreeMap<String, String>,
    ) -> Result<(), ReconcilerError>;

    /// Apply a strategic-merge patch to a Deployment
    async fn patch_deployment(
        &self,
        namespace: &str,
        name: &str,
        patch: serde_json::Value,
    ) -> Result<(), ReconcilerError>;

    /// Delete a dependent. An already missing object is reported, not raised.
    async fn delete(
        &self,
        namespace: &str,
        kind: DependentKind,
        name: &str,
    ) -> Result<DeleteOutcome, ReconcilerError>;

    /// Merge-patch the `status` subresource of a `Client`
    async fn patch_status(
        &self,
        namespace: &str,
        name: &str,
        status: ClientStatus,
    ) -> Result<(), ReconcilerError>;
}

/// [`WorkloadClient`] backed by a live cluster
#[derive(Clone)]
pub struct KubeWorkloadClient {
    client: Client,
}

impl std::fmt::Debug for KubeWorkloadClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeWorkloadClient").finish_non_exhaustive()
    }
}

impl KubeWorkloadClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn api<K>(&self, namespace: &str) -> Api<K>
    where
        K: Resource<Scope = NamespaceResourceScope>,
        <K as Resource>::DynamicType: Default,
    {
        Api::namespaced(self.client.clone(), namespace)
    }

    async fn exists_as<K>(&self, namespace: &str, name: &str) -> Result<bool, ReconcilerError>
    where
        K: Resource<Scope = NamespaceResourceScope> + Clone + DeserializeOwned + Debug,
        <K as Resource>::DynamicType: Default,
    {
        Ok(self.api::<K>(namespace).get_opt(name).await?.is_some())
    }

    async fn create_as<K>(&self, namespace: &str, object: &K) -> Result<CreateOutcome, ReconcilerError>
    where
        K: Resource<Scope = NamespaceResourceScope> + Clone + DeserializeOwned + Serialize + Debug,
        <K as Resource>::DynamicType: Default,
    {
        match self
            .api::<K>(namespace)
            .create(&PostParams::default(), object)
            .await
        {
            Ok(_) => Ok(CreateOutcome::Created),
            Err(kube::Error::Api(e)) if e.code == 409 => Ok(CreateOutcome::AlreadyExists),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete_as<K>(&self, namespace: &str, name: &str) -> Result<DeleteOutcome, ReconcilerError>
    where
        K: Resource<Scope = NamespaceResourceScope> + Clone + DeserializeOwned + Debug,
        <K as Resource>::DynamicType: Default,
    {
        match self
            .api::<K>(namespace)
            .delete(name, &DeleteParams::background())
            .await
        {
            Ok(_) => Ok(DeleteOutcome::Deleted),
            Err(kube::Error::Api(e)) if e.code == 404 => Ok(DeleteOutcome::AlreadyAbsent),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl WorkloadClient for KubeWorkloadClient {
    async fn exists(
        &self,
        namespace: &str,
        kind: DependentKind,
        name: &str,
    ) -> Result<bool, ReconcilerError> {
        match kind {
            DependentKind::ConfigMap => self.exists_as::<ConfigMap>(namespace, name).await,
            DependentKind::Deployment => self.exists_as::<Deployment>(namespace, name).await,
            DependentKind::Service => self.exists_as::<Service>(namespace, name).await,
            DependentKind::HorizontalPodAutoscaler => {
                self.exists_as::<HorizontalPodAutoscaler>(namespace, name)
                    .await
            }
        }
    }

    async fn create(
        &self,
        namespace: &str,
        object: DependentObject,
    ) -> Result<CreateOutcome, ReconcilerError> {
        let span = tracing::info_span!(
            "kubernetes.dependent.create",
            kind = %object.kind(),
            name = %object.name(),
            namespace = namespace
        );
        async move {
            match &object {
                DependentObject::ConfigMap(o) => self.create_as(namespace, o).await,
                DependentObject::Deployment(o) => self.create_as(namespace, o).await,
                DependentObject::Service(o) => self.create_as(namespace, o).await,
                DependentObject::HorizontalPodAutoscaler(o) => self.create_as(namespace, o).await,
            }
        }
        .instrument(span)
        .await
    }

    async fn replace_config_data(
        &self,
        namespace: &str,
        name: &str,
        data: BTreeMap<String, String>,
    ) -> Result<(), ReconcilerError> {
        let api = self.api::<ConfigMap>(namespace);
        // Replace carries the fetched resourceVersion; a concurrent writer surfaces as 409
        let mut config_map = api.get(name).await?;
        config_map.data = Some(data);
        api.replace(name, &PostParams::default(), &config_map)
            .await?;
        debug!("Replaced data of ConfigMap {}/{}", namespace, name);
        Ok(())
    }

    async fn patch_deployment(
        &self,
        namespace: &str,
        name: &str,
        patch: serde_json::Value,
    ) -> Result<(), ReconcilerError> {
        self.api::<Deployment>(namespace)
            .patch(
                name,
                &PatchParams::apply(FIELD_MANAGER),
                &Patch::Strategic(patch),
            )
            .await?;
        debug!("Patched Deployment {}/{}", namespace, name);
        Ok(())
    }

    async fn delete(
        &self,
        namespace: &str,
        kind: DependentKind,
        name: &str,
    ) -> Result<DeleteOutcome, ReconcilerError> {
        match kind {
            DependentKind::ConfigMap => self.delete_as::<ConfigMap>(namespace, name).await,
            DependentKind::Deployment => self.delete_as::<Deployment>(namespace, name).await,
            DependentKind::Service => self.delete_as::<Service>(namespace, name).await,
            DependentKind::HorizontalPodAutoscaler => {
                self.delete_as::<HorizontalPodAutoscaler>(namespace, name)
                    .await
            }
        }
    }

    async fn patch_status(
        &self,
        namespace: &str,
        name: &str,
        status: ClientStatus,
    ) -> Result<(), ReconcilerError> {
        let patch = serde_json::json!({ "status": status });
        self.api::<ClientResource>(namespace)
            .patch_status(
                name,
                &PatchParams::apply(FIELD_MANAGER),
                &Patch::Merge(patch),
            )
            .await?;
        Ok(())
    }
}
