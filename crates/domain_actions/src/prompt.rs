//! Prompt assembly

use serde_json::Value;

use crate::catalog::{ActionSpec, FunctionSpec};
use crate::request::ActionRequest;

/// The two prompts sent to the completion gateway
#[derive(Debug, Clone, PartialEq)]
pub struct PromptPair {
    pub system: String,
    pub user: String,
}

/// Builds the system and user prompt for an action
///
/// `precomputed` is appended verbatim to the user prompt when present so the
/// model comments on figures instead of recomputing them.
pub fn build_prompt(
    function: &FunctionSpec,
    action: &ActionSpec,
    request: &ActionRequest,
    precomputed: Option<&Value>,
) -> PromptPair {
    let system = format!(
        "{role}\n\nRespond ONLY with a single valid JSON object, without markdown fences or commentary. \
         Use exactly this structure:\n{contract}",
        role = function.role,
        contract = action.output_contract,
    );

    let payload = serde_json::to_string_pretty(&request.fields).unwrap_or_else(|_| "{}".to_string());
    let mut user = format!("{}\n\nInput data:\n{}", action.instructions, payload);

    if let Some(figures) = precomputed {
        let figures = serde_json::to_string_pretty(figures).unwrap_or_else(|_| figures.to_string());
        user.push_str("\n\nPre-computed figures (authoritative, do not recompute):\n");
        user.push_str(&figures);
    }

    PromptPair { system, user }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ActionCatalog;
    use serde_json::json;

    #[test]
    fn test_prompt_contains_contract_and_payload() {
        let catalog = ActionCatalog::standard();
        let (function, action) = catalog.resolve("visit-assistant", "summarize_visit").unwrap();
        let request = ActionRequest::new("summarize_visit").with_field("notes", "Client wants FX hedging");

        let prompt = build_prompt(function, action, &request, None);

        assert!(prompt.system.starts_with(&function.role));
        assert!(prompt.system.contains("\"decisions\""));
        assert!(prompt.user.contains("Client wants FX hedging"));
        assert!(!prompt.user.contains("\"action\""));
        assert!(!prompt.user.contains("Pre-computed"));
    }

    #[test]
    fn test_prompt_appends_precomputed_figures() {
        let catalog = ActionCatalog::standard();
        let (function, action) = catalog.resolve("financial-analysis", "ratio_analysis").unwrap();
        let request = ActionRequest::new("ratio_analysis").with_field("statements", json!([]));
        let figures = json!([{"period": "2024", "currentRatio": 1.5}]);

        let prompt = build_prompt(function, action, &request, Some(&figures));

        assert!(prompt.user.contains("Pre-computed figures"));
        assert!(prompt.user.contains("currentRatio"));
    }
}
