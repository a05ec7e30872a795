//! # CRD Generator
//!
//! Prints the `Client` CustomResourceDefinition as YAML.
//!
//! ```bash
//! cargo run --bin crdgen > config/crd/client.yaml
//! cargo run --bin crdgen | kubectl apply -f -
//! ```

use kube::core::CustomResourceExt;
use shoplift_operator::crd::ClientResource;

fn main() {
    match serde_yaml::to_string(&ClientResource::crd()) {
        Ok(yaml) => print!("{yaml}"),
        Err(e) => {
            eprintln!("Failed to serialize CRD: {e}");
            std::process::exit(1);
        }
    }
}
