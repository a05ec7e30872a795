//! Object name rules for ingestion.

/// Whether `name` is a client configuration upload
pub fn is_config_object(name: &str, suffix: &str) -> bool {
    name.ends_with(suffix)
}

/// Whether `name` already lives under the processed prefix
pub fn is_processed(name: &str, processed_prefix: &str) -> bool {
    name.starts_with(processed_prefix)
}

/// Client identifier for an object: the base filename without its final
/// extension.
///
/// Leading dots belong to the name, so `.xml` stays `.xml` rather than
/// becoming empty.
pub fn derive_client_id(name: &str) -> &str {
    let base = name.rsplit('/').next().unwrap_or(name);
    match base.rfind('.') {
        Some(dot) if base[..dot].chars().any(|c| c != '.') => &base[..dot],
        _ => base,
    }
}

/// Destination an ingested object is relocated to
pub fn processed_path(name: &str, processed_prefix: &str) -> String {
    format!("{processed_prefix}{name}")
}
