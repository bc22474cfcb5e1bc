//! Incoming action requests and their caller context

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use core_kernel::{RequestId, TenantId, UserId};

/// Body of a function call: the `action` discriminant plus free-form fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRequest {
    pub action: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl ActionRequest {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            fields: Map::new(),
        }
    }

    /// Adds a field
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Returns a field unless it is absent or null
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name).filter(|v| !v.is_null())
    }
}

/// Who is calling, attached by the HTTP layer after authentication
#[derive(Debug, Clone)]
pub struct ActionContext {
    pub tenant_id: TenantId,
    pub user_id: UserId,
    pub request_id: RequestId,
}

impl ActionContext {
    pub fn new(tenant_id: TenantId, user_id: UserId) -> Self {
        Self {
            tenant_id,
            user_id,
            request_id: RequestId::new_v7(),
        }
    }

    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = request_id;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_flattens_fields() {
        let request: ActionRequest = serde_json::from_value(json!({
            "action": "summarize_visit",
            "notes": "Met CFO",
            "visit_id": 42
        }))
        .unwrap();

        assert_eq!(request.action, "summarize_visit");
        assert_eq!(request.fields.len(), 2);
        assert_eq!(request.field("notes"), Some(&json!("Met CFO")));
    }

    #[test]
    fn test_null_field_is_absent() {
        let request = ActionRequest::new("explain_rule").with_field("rule", Value::Null);
        assert!(request.field("rule").is_none());
    }
}
