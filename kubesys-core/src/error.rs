use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An error response from the API.
///
/// Either decoded from a `Status` object the server sent back, or synthesized from
/// the HTTP status line when the body was not a `Status`.
#[derive(Error, Deserialize, Serialize, Debug, Clone, Eq, PartialEq)]
#[error("{status} ({code}): {message}")]
pub struct ErrorResponse {
    /// The status, either `Failure` or the verbatim HTTP status line
    pub status: String,
    /// A message about the error
    #[serde(default)]
    pub message: String,
    /// The reason for the error
    #[serde(default)]
    pub reason: String,
    /// The error code
    pub code: u16,
}

#[cfg(test)]
mod tests {
    use super::ErrorResponse;
    use serde_json::json;

    #[test]
    fn decodes_status_object() {
        let status = json!({
            "kind": "Status",
            "apiVersion": "v1",
            "metadata": {},
            "status": "Failure",
            "message": "pods \"ghost\" not found",
            "reason": "NotFound",
            "details": {"name": "ghost", "kind": "pods"},
            "code": 404
        });
        let err: ErrorResponse = serde_json::from_value(status).unwrap();
        assert_eq!(err.code, 404);
        assert_eq!(err.reason, "NotFound");
        assert_eq!(err.to_string(), "Failure (404): pods \"ghost\" not found");
    }

    #[test]
    fn message_and_reason_default_to_empty() {
        let err: ErrorResponse = serde_json::from_value(json!({"status": "Failure", "code": 500})).unwrap();
        assert!(err.message.is_empty());
        assert!(err.reason.is_empty());
    }
}
