//! # Configuration
//!
//! Process-level settings for the operator and the ingestion function,
//! loaded from environment variables with defaults.

mod controller;
mod ingest;

pub use controller::{ControllerConfig, LogFormat};
pub use ingest::IngestConfig;

/// Read environment variable or return default value
pub(crate) fn env_var_or_default<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Read environment variable as boolean or return default
pub(crate) fn env_var_or_default_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map_or(default, |v| parse_bool(&v).unwrap_or(default))
}

/// Read environment variable as string or return default
pub(crate) fn env_var_or_default_str(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Read environment variable, treating empty values as unset
pub(crate) fn env_var_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool_accepts_common_spellings() {
        for v in ["true", "TRUE", "1", "yes", "on", " On "] {
            assert_eq!(parse_bool(v), Some(true), "{v}");
        }
        for v in ["false", "0", "no", "off"] {
            assert_eq!(parse_bool(v), Some(false), "{v}");
        }
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn test_env_var_or_default_falls_back_on_garbage() {
        std::env::set_var("SHOPLIFT_TEST_PORT_GARBAGE", "not-a-port");
        assert_eq!(env_var_or_default("SHOPLIFT_TEST_PORT_GARBAGE", 8080u16), 8080);
        std::env::remove_var("SHOPLIFT_TEST_PORT_GARBAGE");
    }

    #[test]
    fn test_env_var_opt_treats_blank_as_unset() {
        std::env::set_var("SHOPLIFT_TEST_BLANK", "  ");
        assert_eq!(env_var_opt("SHOPLIFT_TEST_BLANK"), None);
        std::env::remove_var("SHOPLIFT_TEST_BLANK");
    }
}
