//! # Response Types
//!
//! Cloud Storage JSON API and metadata server response structures.

use serde::Deserialize;

/// Error envelope returned by Google APIs
///
/// `{"error": {"code": 404, "message": "No such object: bucket/name", "errors": [...]}}`
#[derive(Debug, Deserialize)]
pub struct GcsErrorResponse {
    pub error: GcsError,
}

#[derive(Debug, Deserialize)]
pub struct GcsError {
    pub code: u16,
    pub message: String,
    #[serde(default)]
    pub status: Option<String>,
}

/// Object resource returned by `copyTo`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectResource {
    pub bucket: String,
    pub name: String,
    #[serde(default)]
    pub generation: Option<String>,
}

/// Access token issued by the GCE metadata server
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    /// Lifetime in seconds
    pub expires_in: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_without_status() {
        let body = r#"{"error":{"code":404,"message":"No such object: uploads/acme.xml","errors":[{"domain":"global","reason":"notFound"}]}}"#;
        let parsed: GcsErrorResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.error.code, 404);
        assert_eq!(parsed.error.message, "No such object: uploads/acme.xml");
        assert!(parsed.error.status.is_none());
    }
}
