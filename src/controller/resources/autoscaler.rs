use super::{autoscaler_name, dependent_metadata};
use crate::constants::{HPA_MAX_REPLICAS, HPA_MIN_REPLICAS, HPA_TARGET_CPU_UTILIZATION};
use crate::crd::ClientResource;
use k8s_openapi::api::autoscaling::v2::{
    CrossVersionObjectReference, HorizontalPodAutoscaler, HorizontalPodAutoscalerSpec, MetricSpec,
    MetricTarget, ResourceMetricSource,
};
use kube::ResourceExt;

pub fn build_autoscaler(client: &ClientResource) -> HorizontalPodAutoscaler {
    let name = client.name_any();

    HorizontalPodAutoscaler {
        metadata: dependent_metadata(client, autoscaler_name(&name)),
        spec: Some(HorizontalPodAutoscalerSpec {
            scale_target_ref: CrossVersionObjectReference {
                api_version: Some("apps/v1".to_string()),
                kind: "Deployment".to_string(),
                name,
            },
            min_replicas: Some(HPA_MIN_REPLICAS),
            max_replicas: HPA_MAX_REPLICAS,
            metrics: Some(vec![MetricSpec {
                type_: "Resource".to_string(),
                resource: Some(ResourceMetricSource {
                    name: "cpu".to_string(),
                    target: MetricTarget {
                        type_: "Utilization".to_string(),
                        average_utilization: Some(HPA_TARGET_CPU_UTILIZATION),
                        ..Default::default()
                    },
                }),
                ..Default::default()
            }]),
            ..Default::default()
        }),
        ..Default::default()
    }
}
