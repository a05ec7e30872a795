//! # Dependent Resources
//!
//! Declarative definitions of the four workload objects provisioned for each
//! `Client`. Builders are pure: they never talk to the API server.
//!
//! - `configmap.rs` - `<name>-config` holding the raw configuration payload
//! - `deployment.rs` - `<name>` running the detector container
//! - `service.rs` - `<name>` exposing port 80
//! - `autoscaler.rs` - `<name>-hpa` scaling the deployment on CPU

mod autoscaler;
mod configmap;
mod deployment;
mod service;

pub use autoscaler::build_autoscaler;
pub use configmap::{build_config_map, config_data};
pub use deployment::{build_deployment, image_patch};
pub use service::build_service;

use crate::constants::{CONFIG_MAP_SUFFIX, FIELD_MANAGER, HPA_SUFFIX};
use crate::crd::ClientResource;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::autoscaling::v2::HorizontalPodAutoscaler;
use k8s_openapi::api::core::v1::{ConfigMap, Service};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::{Resource, ResourceExt};
use std::collections::BTreeMap;

/// The kinds of object making up a client's dependent workload set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DependentKind {
    ConfigMap,
    Deployment,
    Service,
    HorizontalPodAutoscaler,
}

impl DependentKind {
    /// Creation order
    pub const PROVISION_ORDER: [DependentKind; 4] = [
        DependentKind::Deployment,
        DependentKind::ConfigMap,
        DependentKind::Service,
        DependentKind::HorizontalPodAutoscaler,
    ];

    /// Deletion order, the reverse of provisioning
    pub const TEARDOWN_ORDER: [DependentKind; 4] = [
        DependentKind::HorizontalPodAutoscaler,
        DependentKind::Service,
        DependentKind::ConfigMap,
        DependentKind::Deployment,
    ];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            DependentKind::ConfigMap => "ConfigMap",
            DependentKind::Deployment => "Deployment",
            DependentKind::Service => "Service",
            DependentKind::HorizontalPodAutoscaler => "HorizontalPodAutoscaler",
        }
    }

    /// Name of this dependent for the client named `client_name`
    #[must_use]
    pub fn object_name(&self, client_name: &str) -> String {
        match self {
            DependentKind::ConfigMap => config_map_name(client_name),
            DependentKind::Deployment | DependentKind::Service => client_name.to_string(),
            DependentKind::HorizontalPodAutoscaler => autoscaler_name(client_name),
        }
    }
}

impl std::fmt::Display for DependentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully built dependent object ready to be submitted
#[derive(Debug, Clone)]
pub enum DependentObject {
    ConfigMap(ConfigMap),
    Deployment(Deployment),
    Service(Service),
    HorizontalPodAutoscaler(HorizontalPodAutoscaler),
}

impl DependentObject {
    /// Build the dependent of `kind` for `client`
    pub fn build(kind: DependentKind, client: &ClientResource) -> Self {
        match kind {
            DependentKind::ConfigMap => Self::ConfigMap(build_config_map(client)),
            DependentKind::Deployment => Self::Deployment(build_deployment(client)),
            DependentKind::Service => Self::Service(build_service(client)),
            DependentKind::HorizontalPodAutoscaler => {
                Self::HorizontalPodAutoscaler(build_autoscaler(client))
            }
        }
    }

    #[must_use]
    pub fn kind(&self) -> DependentKind {
        match self {
            Self::ConfigMap(_) => DependentKind::ConfigMap,
            Self::Deployment(_) => DependentKind::Deployment,
            Self::Service(_) => DependentKind::Service,
            Self::HorizontalPodAutoscaler(_) => DependentKind::HorizontalPodAutoscaler,
        }
    }

    #[must_use]
    pub fn name(&self) -> String {
        match self {
            Self::ConfigMap(o) => o.name_any(),
            Self::Deployment(o) => o.name_any(),
            Self::Service(o) => o.name_any(),
            Self::HorizontalPodAutoscaler(o) => o.name_any(),
        }
    }
}

pub fn config_map_name(client_name: &str) -> String {
    format!("{client_name}{CONFIG_MAP_SUFFIX}")
}

pub fn autoscaler_name(client_name: &str) -> String {
    format!("{client_name}{HPA_SUFFIX}")
}

/// Selector labels shared by the deployment, its pods and the service
pub fn app_labels(client_name: &str) -> BTreeMap<String, String> {
    BTreeMap::from([("app".to_string(), client_name.to_string())])
}

/// Metadata for a dependent: namespaced with its owner and controller-owned by it
pub(crate) fn dependent_metadata(client: &ClientResource, name: String) -> ObjectMeta {
    let mut labels = app_labels(&client.name_any());
    labels.insert(
        "app.kubernetes.io/managed-by".to_string(),
        FIELD_MANAGER.to_string(),
    );

    ObjectMeta {
        name: Some(name),
        namespace: client.namespace(),
        labels: Some(labels),
        owner_references: client.controller_owner_ref(&()).map(|oref| vec![oref]),
        ..Default::default()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::crd::ClientResource;

    /// A stored `Client` as the API server would hand it to the controller
    pub fn stored_client(name: &str, xml: &str) -> ClientResource {
        let mut client = ClientResource::for_ingestion(name, xml.to_string());
        client.metadata.namespace = Some("default".to_string());
        client.metadata.uid = Some(format!("uid-{name}"));
        client.metadata.generation = Some(1);
        client
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::stored_client;
    use super::*;

    #[test]
    fn test_dependent_names_for_acme() {
        let names: Vec<(DependentKind, String)> = DependentKind::PROVISION_ORDER
            .iter()
            .map(|k| (*k, k.object_name("acme")))
            .collect();

        assert_eq!(
            names,
            vec![
                (DependentKind::Deployment, "acme".to_string()),
                (DependentKind::ConfigMap, "acme-config".to_string()),
                (DependentKind::Service, "acme".to_string()),
                (DependentKind::HorizontalPodAutoscaler, "acme-hpa".to_string()),
            ]
        );
    }

    #[test]
    fn test_teardown_covers_every_kind() {
        for kind in DependentKind::PROVISION_ORDER {
            assert!(DependentKind::TEARDOWN_ORDER.contains(&kind));
        }
    }

    #[test]
    fn test_dependent_metadata_owner_reference() {
        let client = stored_client("acme", "<config/>");
        let meta = dependent_metadata(&client, "acme-config".to_string());

        assert_eq!(meta.name.as_deref(), Some("acme-config"));
        assert_eq!(meta.namespace.as_deref(), Some("default"));
        assert_eq!(meta.labels.as_ref().unwrap()["app"], "acme");

        let owners = meta.owner_references.unwrap();
        assert_eq!(owners.len(), 1);
        assert_eq!(owners[0].kind, "Client");
        assert_eq!(owners[0].name, "acme");
        assert_eq!(owners[0].uid, "uid-acme");
        assert_eq!(owners[0].controller, Some(true));
    }

    #[test]
    fn test_built_object_reports_kind_and_name() {
        let client = stored_client("acme", "<config/>");
        for kind in DependentKind::PROVISION_ORDER {
            let object = DependentObject::build(kind, &client);
            assert_eq!(object.kind(), kind);
            assert_eq!(object.name(), kind.object_name("acme"));
        }
    }
}
