use super::{app_labels, dependent_metadata};
use crate::constants::{SERVICE_PORT, SERVICE_TARGET_PORT};
use crate::crd::ClientResource;
use k8s_openapi::api::core::v1::{Service, ServicePort, ServiceSpec};
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use kube::ResourceExt;

pub fn build_service(client: &ClientResource) -> Service {
    let name = client.name_any();

    Service {
        metadata: dependent_metadata(client, name.clone()),
        spec: Some(ServiceSpec {
            selector: Some(app_labels(&name)),
            ports: Some(vec![ServicePort {
                port: SERVICE_PORT,
                target_port: Some(IntOrString::Int(SERVICE_TARGET_PORT)),
                ..Default::default()
            }]),
            ..Default::default()
        }),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::resources::test_support::stored_client;

    #[test]
    fn test_service_routes_80_to_8080() {
        let service = build_service(&stored_client("acme", "<config/>"));
        assert_eq!(service.metadata.name.as_deref(), Some("acme"));

        let spec = service.spec.unwrap();
        assert_eq!(spec.selector.unwrap()["app"], "acme");

        let ports = spec.ports.unwrap();
        assert_eq!(ports.len(), 1);
        assert_eq!(ports[0].port, 80);
        assert_eq!(ports[0].target_port, Some(IntOrString::Int(8080)));
    }
}
