use super::{config_map_name, dependent_metadata};
use crate::constants::CONFIG_DATA_KEY;
use crate::crd::ClientResource;
use k8s_openapi::api::core::v1::ConfigMap;
use kube::ResourceExt;
use std::collections::BTreeMap;

/// ConfigMap data carrying the payload verbatim under `config.xml`
pub fn config_data(xml_config: &str) -> BTreeMap<String, String> {
    BTreeMap::from([(CONFIG_DATA_KEY.to_string(), xml_config.to_string())])
}

pub fn build_config_map(client: &ClientResource) -> ConfigMap {
    ConfigMap {
        metadata: dependent_metadata(client, config_map_name(&client.name_any())),
        data: Some(config_data(&client.spec.xml_config)),
        ..Default::default()
    }
}
