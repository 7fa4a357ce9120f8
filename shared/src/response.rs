//! Portal API response envelope
//!
//! Every JSON endpoint of the portal backend answers with the same shape:
//! ```json
//! {
//!     "success": true,
//!     "data": { ... },
//!     "error": null
//! }
//! ```
//! Expected failures (ticket not found, rejected request) travel inside the
//! envelope with `success = false`; they are not transport errors.

use serde::{Deserialize, Serialize};

/// Uniform success/error envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortalResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> PortalResponse<T> {
    /// Create a successful response
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// Create a failed response carrying a human-readable message
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }

    /// The payload of a successful response.
    ///
    /// A response flagged as successful but without data counts as a miss.
    pub fn into_data(self) -> Option<T> {
        if self.success { self.data } else { None }
    }

    /// Server-provided error message, ignoring blank strings
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref().map(str::trim).filter(|m| !m.is_empty())
    }

    /// Convert into a `Result`, falling back to `fallback` when the server
    /// gave no usable message.
    pub fn into_result(self, fallback: &str) -> Result<T, String> {
        let message = self
            .error_message()
            .map(str::to_string)
            .unwrap_or_else(|| fallback.to_string());
        match (self.success, self.data) {
            (true, Some(data)) => Ok(data),
            _ => Err(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_success_envelope() {
        let resp: PortalResponse<serde_json::Value> =
            serde_json::from_value(json!({"success": true, "data": {"message": "ok"}})).unwrap();
        assert!(resp.success);
        assert_eq!(resp.error, None);
        assert_eq!(resp.into_data(), Some(json!({"message": "ok"})));
    }

    #[test]
    fn test_decode_failure_envelope() {
        let resp: PortalResponse<serde_json::Value> =
            serde_json::from_value(json!({"success": false, "error": "RFC inválido"})).unwrap();
        assert!(!resp.success);
        assert_eq!(resp.error_message(), Some("RFC inválido"));
        assert_eq!(resp.into_result("fallback"), Err("RFC inválido".to_string()));
    }

    #[test]
    fn test_blank_error_uses_fallback() {
        let resp: PortalResponse<()> = PortalResponse::failure("   ");
        assert_eq!(resp.error_message(), None);
        assert_eq!(resp.into_result("genérico"), Err("genérico".to_string()));
    }

    #[test]
    fn test_success_without_data_is_a_miss() {
        let resp: PortalResponse<String> =
            serde_json::from_value(json!({"success": true})).unwrap();
        assert_eq!(resp.clone().into_data(), None);
        assert_eq!(resp.into_result("sin datos"), Err("sin datos".to_string()));
    }
}
