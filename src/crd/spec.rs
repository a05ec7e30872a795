//! # Client Spec
//!
//! The `Client` custom resource carries one client's raw configuration payload.

use serde::{Deserialize, Serialize};

/// Client Custom Resource Definition
///
/// Created by the ingestion function from an uploaded `<clientId>.xml` object
/// and reconciled by the operator into a ConfigMap, Deployment, Service and
/// HorizontalPodAutoscaler.
///
/// # Example
///
/// ```yaml
/// apiVersion: shoplift.example.com/v1
/// kind: Client
/// metadata:
///   name: acme
///   namespace: default
/// spec:
///   clientId: acme
///   xmlConfig: |
///     <config><camera id="1"/></config>
/// ```
#[derive(kube::CustomResource, Debug, Clone, PartialEq, Deserialize, Serialize, schemars::JsonSchema)]
#[kube(
    kind = "Client",
    root = "ClientResource",
    group = "shoplift.example.com",
    version = "v1",
    namespaced,
    status = "crate::crd::ClientStatus",
    shortname = "cl",
    printcolumn = r#"{"name":"ClientId", "type":"string", "jsonPath":".spec.clientId"}, {"name":"Phase", "type":"string", "jsonPath":".status.phase"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct ClientSpec {
    /// Client identifier, derived from the uploaded object's base filename
    #[serde(default)]
    pub client_id: String,
    /// Raw configuration payload, stored verbatim in the client's ConfigMap
    pub xml_config: String,
}

impl ClientResource {
    /// Build a resource for ingestion: name and client id are both `client_id`
    pub fn for_ingestion(client_id: &str, xml_config: String) -> Self {
        Self::new(
            client_id,
            ClientSpec {
                client_id: client_id.to_string(),
                xml_config,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{CLIENT_GROUP, CLIENT_VERSION};
    use kube::core::CustomResourceExt;
    use kube::Resource;

    #[test]
    fn test_crd_identity() {
        let crd = ClientResource::crd();
        assert_eq!(crd.spec.group, "shoplift.example.com");
        assert_eq!(crd.spec.names.kind, "Client");
        assert_eq!(crd.spec.names.plural, "clients");
        assert_eq!(crd.spec.versions.len(), 1);
        assert_eq!(crd.spec.versions[0].name, "v1");
        assert_eq!(ClientResource::api_version(&()), "shoplift.example.com/v1");
        assert_eq!(
            ClientResource::api_version(&()),
            format!("{CLIENT_GROUP}/{CLIENT_VERSION}")
        );
    }

    #[test]
    fn test_ingestion_body_shape() {
        let client = ClientResource::for_ingestion("acme", "<config/>".to_string());
        let body = serde_json::to_value(&client).unwrap();

        assert_eq!(body["apiVersion"], "shoplift.example.com/v1");
        assert_eq!(body["kind"], "Client");
        assert_eq!(body["metadata"]["name"], "acme");
        assert_eq!(body["spec"]["clientId"], "acme");
        assert_eq!(body["spec"]["xmlConfig"], "<config/>");
        assert!(body.get("status").map_or(true, serde_json::Value::is_null));
    }

    #[test]
    fn test_spec_without_client_id_parses() {
        let spec: ClientSpec = serde_json::from_value(serde_json::json!({
            "xmlConfig": "<config/>"
        }))
        .unwrap();
        assert_eq!(spec.client_id, "");
        assert_eq!(spec.xml_config, "<config/>");
    }
}
