use super::{app_labels, config_map_name, dependent_metadata};
use crate::constants::{
    CONFIG_MOUNT_PATH, CONFIG_VOLUME_NAME, CPU_LIMIT, CPU_REQUEST, DETECTOR_CONTAINER_NAME,
    DETECTOR_IMAGE, INITIAL_REPLICAS, MEMORY_LIMIT, MEMORY_REQUEST,
};
use crate::crd::ClientResource;
use k8s_openapi::api::apps::v1::{Deployment, DeploymentSpec};
use k8s_openapi::api::core::v1::{
    ConfigMapVolumeSource, Container, PodSpec, PodTemplateSpec, ResourceRequirements, Volume,
    VolumeMount,
};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, ObjectMeta};
use kube::ResourceExt;
use std::collections::BTreeMap;

fn quantities(cpu: &str, memory: &str) -> BTreeMap<String, Quantity> {
    BTreeMap::from([
        ("cpu".to_string(), Quantity(cpu.to_string())),
        ("memory".to_string(), Quantity(memory.to_string())),
    ])
}

fn detector_container() -> Container {
    Container {
        name: DETECTOR_CONTAINER_NAME.to_string(),
        image: Some(DETECTOR_IMAGE.to_string()),
        volume_mounts: Some(vec![VolumeMount {
            name: CONFIG_VOLUME_NAME.to_string(),
            mount_path: CONFIG_MOUNT_PATH.to_string(),
            read_only: Some(true),
            ..Default::default()
        }]),
        resources: Some(ResourceRequirements {
            requests: Some(quantities(CPU_REQUEST, MEMORY_REQUEST)),
            limits: Some(quantities(CPU_LIMIT, MEMORY_LIMIT)),
            ..Default::default()
        }),
        ..Default::default()
    }
}

pub fn build_deployment(client: &ClientResource) -> Deployment {
    let name = client.name_any();
    let labels = app_labels(&name);

    Deployment {
        metadata: dependent_metadata(client, name.clone()),
        spec: Some(DeploymentSpec {
            replicas: Some(INITIAL_REPLICAS),
            selector: LabelSelector {
                match_labels: Some(labels.clone()),
                ..Default::default()
            },
            template: PodTemplateSpec {
                metadata: Some(ObjectMeta {
                    labels: Some(labels),
                    ..Default::default()
                }),
                spec: Some(PodSpec {
                    containers: vec![detector_container()],
                    volumes: Some(vec![Volume {
                        name: CONFIG_VOLUME_NAME.to_string(),
                        config_map: Some(ConfigMapVolumeSource {
                            name: config_map_name(&name),
                            ..Default::default()
                        }),
                        ..Default::default()
                    }]),
                    ..Default::default()
                }),
            },
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// Strategic-merge patch setting the detector container's image.
///
/// Containers merge by name, so no other container field is touched.
pub fn image_patch() -> serde_json::Value {
    serde_json::json!({
        "spec": {
            "template": {
                "spec": {
                    "containers": [{
                        "name": DETECTOR_CONTAINER_NAME,
                        "image": DETECTOR_IMAGE,
                    }]
                }
            }
        }
    })
}
