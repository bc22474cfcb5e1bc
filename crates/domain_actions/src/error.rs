//! Action domain errors

use core_kernel::PortError;
use thiserror::Error;

/// Errors that can occur while dispatching an AI action
#[derive(Debug, Error)]
pub enum ActionError {
    /// No function is registered under this name
    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    /// The function exists but does not handle this action
    #[error("Unsupported action '{action}' for function '{function}'")]
    UnsupportedAction {
        function: String,
        action: String,
    },

    /// A field the action needs is absent or null
    #[error("Missing required field '{field}' for action '{action}'")]
    MissingField {
        action: String,
        field: String,
    },

    /// A field is present but has the wrong shape
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// The completion gateway failed
    #[error("Gateway error: {0}")]
    Gateway(#[from] PortError),
}

impl ActionError {
    pub fn unsupported(function: impl Into<String>, action: impl Into<String>) -> Self {
        ActionError::UnsupportedAction {
            function: function.into(),
            action: action.into(),
        }
    }

    pub fn missing_field(action: impl Into<String>, field: impl Into<String>) -> Self {
        ActionError::MissingField {
            action: action.into(),
            field: field.into(),
        }
    }

    /// Returns true if the caller sent a request the catalog cannot serve
    pub fn is_client_error(&self) -> bool {
        !matches!(self, ActionError::Gateway(_))
    }
}
