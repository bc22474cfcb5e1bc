//! Action dispatcher

use std::sync::Arc;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, instrument, warn};

use crate::catalog::{ActionCatalog, Precompute};
use crate::error::ActionError;
use crate::extract::extract_json;
use crate::financial::compute_ratios;
use crate::ports::{CompletionPort, CompletionRequest, TokenUsage};
use crate::prompt::build_prompt;
use crate::request::{ActionContext, ActionRequest};

/// Result of a dispatched action
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionOutcome {
    pub function: String,
    pub action: String,
    /// Extracted JSON, or `{ rawResponse, parseError: true }`
    pub data: Value,
    pub parse_error: bool,
    pub model: Option<String>,
    pub usage: Option<TokenUsage>,
}

/// Runs actions from the catalog against a completion gateway
#[derive(Clone)]
pub struct ActionDispatcher {
    catalog: Arc<ActionCatalog>,
    gateway: Arc<dyn CompletionPort>,
}

impl ActionDispatcher {
    pub fn new(catalog: ActionCatalog, gateway: Arc<dyn CompletionPort>) -> Self {
        Self {
            catalog: Arc::new(catalog),
            gateway,
        }
    }

    pub fn catalog(&self) -> &ActionCatalog {
        &self.catalog
    }

    pub fn gateway(&self) -> &Arc<dyn CompletionPort> {
        &self.gateway
    }

    /// Dispatches one action
    ///
    /// Catalog and validation errors are raised before the gateway is
    /// contacted. A reply without parseable JSON is not an error: it comes
    /// back with `parse_error` set.
    #[instrument(
        skip(self, request, context),
        fields(action = %request.action, tenant = %context.tenant_id, request_id = %context.request_id)
    )]
    pub async fn dispatch(
        &self,
        function: &str,
        request: ActionRequest,
        context: &ActionContext,
    ) -> Result<ActionOutcome, ActionError> {
        let (function_spec, action_spec) = self.catalog.resolve(function, &request.action)?;
        action_spec.validate(&request)?;

        let precomputed = match action_spec.precompute {
            Precompute::None => None,
            Precompute::FinancialRatios => {
                let statements = request
                    .field("statements")
                    .ok_or_else(|| ActionError::missing_field(&request.action, "statements"))?;
                let ratios = compute_ratios(statements)?;
                Some(Value::Array(ratios.iter().map(|r| r.to_json()).collect()))
            }
        };

        let prompt = build_prompt(function_spec, action_spec, &request, precomputed.as_ref());

        let completion = self
            .gateway
            .complete(CompletionRequest {
                system_prompt: prompt.system,
                user_prompt: prompt.user,
                temperature: action_spec.temperature,
                end_user: Some(context.tenant_id.to_string()),
            })
            .await
            .map_err(|e| {
                warn!(error = %e, "Completion gateway failed");
                ActionError::Gateway(e)
            })?;

        let extracted = extract_json(&completion.content);
        let parse_error = extracted.is_parse_error();
        let mut data = extracted.into_data();

        if let (Some(figures), Value::Object(map)) = (precomputed, &mut data) {
            map.insert("computedRatios".to_string(), figures);
        }

        info!(parse_error, model = ?completion.model, "Action completed");

        Ok(ActionOutcome {
            function: function_spec.name.clone(),
            action: request.action,
            data,
            parse_error,
            model: completion.model,
            usage: completion.usage,
        })
    }
}
