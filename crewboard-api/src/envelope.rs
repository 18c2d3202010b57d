//! Uniform response envelope
//!
//! Every non-error payload (and every error body) is wrapped in the same
//! shape so clients can branch on a single field:
//!
//! ```json
//! {"status": "ok", "message": {"data": "logged out"}}
//! {"status": "fail", "message": {"error": "conflict", "detail": "email already in use"}}
//! ```

use serde::{Deserialize, Serialize};

/// Response wrapper carrying a status marker and the actual payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    /// "ok" for successes, "fail" for errors
    pub status: String,

    /// Operation-specific payload
    pub message: T,
}

impl<T> Envelope<T> {
    /// Wraps a payload in a success envelope
    pub fn ok(message: T) -> Self {
        Self {
            status: "ok".to_string(),
            message,
        }
    }

    /// Wraps a payload in a failure envelope
    pub fn fail(message: T) -> Self {
        Self {
            status: "fail".to_string(),
            message,
        }
    }
}

/// Payload wrapper for operations that respond under a "data" key
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Data<T> {
    /// The wrapped value
    pub data: T,
}

impl<T> Data<T> {
    /// Wraps a value under the "data" key
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ok_envelope_shape() {
        let envelope = Envelope::ok(Data::new("logged out"));
        let value = serde_json::to_value(&envelope).unwrap();

        assert_eq!(value, json!({"status": "ok", "message": {"data": "logged out"}}));
    }

    #[test]
    fn test_fail_envelope_shape() {
        let envelope = Envelope::fail("Internal server error");
        let value = serde_json::to_value(&envelope).unwrap();

        assert_eq!(value["status"], "fail");
        assert_eq!(value["message"], "Internal server error");
    }
}
