//! Response envelope shared by every function endpoint

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `{ success, action, data, timestamp }` or `{ success: false, error, timestamp }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl Envelope {
    /// Successful result echoing the action
    pub fn success(action: impl Into<String>, data: Value) -> Self {
        Self {
            success: true,
            action: Some(action.into()),
            data: Some(data),
            error: None,
            timestamp: Utc::now(),
        }
    }

    /// Successful result for endpoints without an action discriminant
    pub fn data(data: Value) -> Self {
        Self {
            success: true,
            action: None,
            data: Some(data),
            error: None,
            timestamp: Utc::now(),
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            action: None,
            data: None,
            error: Some(error.into()),
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_shape() {
        let envelope = Envelope::success("analyze_company", json!({"summary": "ok"}));
        let value = serde_json::to_value(&envelope).unwrap();

        assert_eq!(value["success"], true);
        assert_eq!(value["action"], "analyze_company");
        assert_eq!(value["data"]["summary"], "ok");
        assert!(value.get("error").is_none());
        assert!(value["timestamp"].is_string());
    }

    #[test]
    fn test_failure_shape() {
        let value = serde_json::to_value(Envelope::failure("boom")).unwrap();

        assert_eq!(value["success"], false);
        assert_eq!(value["error"], "boom");
        assert!(value.get("action").is_none());
        assert!(value.get("data").is_none());
    }
}
