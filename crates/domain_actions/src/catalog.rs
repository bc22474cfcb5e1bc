//! Action catalog
//!
//! The routing table shared by every AI function. A function groups related
//! actions under one persona; an action carries its instructions, the JSON
//! shape the model must return, and the request fields it cannot run without.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::error::ActionError;
use crate::request::ActionRequest;

/// Local computation that runs before the prompt is built
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Precompute {
    None,
    /// Parse `statements` and attach ratios (see [`crate::financial`])
    FinancialRatios,
}

/// One action of a function
#[derive(Debug, Clone, Serialize)]
pub struct ActionSpec {
    pub name: String,
    pub instructions: String,
    /// JSON skeleton the model is asked to fill
    pub output_contract: String,
    pub required_fields: Vec<String>,
    pub temperature: f32,
    pub precompute: Precompute,
}

impl ActionSpec {
    pub fn new(
        name: impl Into<String>,
        instructions: impl Into<String>,
        output_contract: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            instructions: instructions.into(),
            output_contract: output_contract.into(),
            required_fields: Vec::new(),
            temperature: 0.3,
            precompute: Precompute::None,
        }
    }

    pub fn requires(mut self, field: impl Into<String>) -> Self {
        self.required_fields.push(field.into());
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn precompute(mut self, precompute: Precompute) -> Self {
        self.precompute = precompute;
        self
    }

    /// Checks that every required field is present and non-null
    pub fn validate(&self, request: &ActionRequest) -> Result<(), ActionError> {
        match self
            .required_fields
            .iter()
            .find(|field| request.field(field).is_none())
        {
            Some(field) => Err(ActionError::missing_field(&self.name, field)),
            None => Ok(()),
        }
    }
}

/// A named group of actions sharing a persona
#[derive(Debug, Clone, Serialize)]
pub struct FunctionSpec {
    pub name: String,
    /// Persona placed at the top of the system prompt
    pub role: String,
    pub actions: Vec<ActionSpec>,
}

impl FunctionSpec {
    pub fn new(name: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            role: role.into(),
            actions: Vec::new(),
        }
    }

    pub fn action(mut self, action: ActionSpec) -> Self {
        self.actions.push(action);
        self
    }

    pub fn find(&self, action: &str) -> Option<&ActionSpec> {
        self.actions.iter().find(|a| a.name == action)
    }

    pub fn action_names(&self) -> Vec<&str> {
        self.actions.iter().map(|a| a.name.as_str()).collect()
    }
}

/// Routing table from function name to its actions
#[derive(Debug, Clone, Default)]
pub struct ActionCatalog {
    functions: BTreeMap<String, FunctionSpec>,
}

impl ActionCatalog {
    /// Creates an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a function, replacing any previous one with the same name
    pub fn register(&mut self, function: FunctionSpec) -> &mut Self {
        self.functions.insert(function.name.clone(), function);
        self
    }

    pub fn function(&self, name: &str) -> Result<&FunctionSpec, ActionError> {
        self.functions
            .get(name)
            .ok_or_else(|| ActionError::UnknownFunction(name.to_string()))
    }

    /// Resolves a function/action pair
    pub fn resolve(&self, function: &str, action: &str) -> Result<(&FunctionSpec, &ActionSpec), ActionError> {
        let spec = self.function(function)?;
        let action_spec = spec
            .find(action)
            .ok_or_else(|| ActionError::unsupported(function, action))?;
        Ok((spec, action_spec))
    }

    pub fn functions(&self) -> impl Iterator<Item = &FunctionSpec> {
        self.functions.values()
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// The catalog served by the CRM
    pub fn standard() -> Self {
        let mut catalog = Self::new();
        catalog
            .register(company_intelligence())
            .register(visit_assistant())
            .register(financial_analysis())
            .register(notification_composer())
            .register(rule_advisor());
        catalog
    }
}

fn company_intelligence() -> FunctionSpec {
    FunctionSpec::new(
        "company-intelligence",
        "You are a corporate banking analyst who profiles business clients for relationship managers.",
    )
    .action(
        ActionSpec::new(
            "analyze_company",
            "Produce a concise profile of the company: sector, business model, key strengths and weaknesses, and the banking products most relevant to it.",
            r#"{"summary": string, "sector": string, "strengths": [string], "weaknesses": [string], "recommendedProducts": [string]}"#,
        )
        .requires("company_name"),
    )
    .action(
        ActionSpec::new(
            "risk_assessment",
            "Assess the credit and operational risk of lending to this company. Score from 1 (lowest risk) to 10 (highest risk).",
            r#"{"riskScore": number, "riskLevel": "low" | "medium" | "high", "factors": [{"factor": string, "impact": string}], "mitigations": [string]}"#,
        )
        .requires("company_name")
        .temperature(0.2),
    )
    .action(
        ActionSpec::new(
            "opportunity_scan",
            "Identify cross-sell and up-sell opportunities for this client, ordered by expected value.",
            r#"{"opportunities": [{"product": string, "rationale": string, "priority": "high" | "medium" | "low"}]}"#,
        )
        .requires("company_name")
        .temperature(0.5),
    )
}

fn visit_assistant() -> FunctionSpec {
    FunctionSpec::new(
        "visit-assistant",
        "You are an assistant that helps relationship managers prepare for and follow up on client visits.",
    )
    .action(
        ActionSpec::new(
            "prepare_visit",
            "Prepare a visit brief: talking points, questions to ask, and documents to bring.",
            r#"{"talkingPoints": [string], "questions": [string], "documents": [string]}"#,
        )
        .requires("company_name"),
    )
    .action(
        ActionSpec::new(
            "summarize_visit",
            "Summarize the visit notes into decisions, client needs, and open issues.",
            r#"{"summary": string, "decisions": [string], "clientNeeds": [string], "openIssues": [string]}"#,
        )
        .requires("notes")
        .temperature(0.2),
    )
    .action(
        ActionSpec::new(
            "follow_up_plan",
            "Draft a follow-up plan with concrete tasks, owners, and due dates relative to the visit.",
            r#"{"tasks": [{"title": string, "owner": string, "dueInDays": number}], "emailDraft": string}"#,
        )
        .requires("notes"),
    )
}

fn financial_analysis() -> FunctionSpec {
    FunctionSpec::new(
        "financial-analysis",
        "You are a credit analyst reviewing the financial statements of a commercial banking client.",
    )
    .action(
        ActionSpec::new(
            "ratio_analysis",
            "Interpret the pre-computed ratios for each period and explain what they say about liquidity, leverage, and profitability.",
            r#"{"liquidity": string, "leverage": string, "profitability": string, "highlights": [string]}"#,
        )
        .requires("statements")
        .temperature(0.2)
        .precompute(Precompute::FinancialRatios),
    )
    .action(
        ActionSpec::new(
            "credit_scoring",
            "Assign an internal credit grade from AAA to D based on the statements and ratios, with the main drivers.",
            r#"{"grade": string, "score": number, "drivers": [string], "recommendedLimit": string}"#,
        )
        .requires("statements")
        .temperature(0.1)
        .precompute(Precompute::FinancialRatios),
    )
    .action(
        ActionSpec::new(
            "trend_analysis",
            "Describe the trend of revenue, profit, and leverage across the periods and flag any deterioration.",
            r#"{"trends": [{"metric": string, "direction": "up" | "down" | "flat", "comment": string}], "warnings": [string]}"#,
        )
        .requires("statements")
        .precompute(Precompute::FinancialRatios),
    )
}

fn notification_composer() -> FunctionSpec {
    FunctionSpec::new(
        "notification-composer",
        "You write short, actionable in-app notifications for banking staff.",
    )
    .action(
        ActionSpec::new(
            "draft_notification",
            "Write a notification for the event: a title under 60 characters and a body under 200 characters.",
            r#"{"title": string, "body": string, "severity": "info" | "warning" | "critical"}"#,
        )
        .requires("event"),
    )
    .action(
        ActionSpec::new(
            "prioritize_notifications",
            "Order the notifications by urgency and explain the top three.",
            r#"{"ordered": [string], "reasons": [{"id": string, "reason": string}]}"#,
        )
        .requires("notifications")
        .temperature(0.1),
    )
}

fn rule_advisor() -> FunctionSpec {
    FunctionSpec::new(
        "rule-advisor",
        "You explain and design business rules for a banking CRM's workflow engine.",
    )
    .action(
        ActionSpec::new(
            "explain_rule",
            "Explain in plain language what the rule does, when it fires, and any edge cases.",
            r#"{"explanation": string, "triggers": [string], "edgeCases": [string]}"#,
        )
        .requires("rule"),
    )
    .action(
        ActionSpec::new(
            "suggest_rules",
            "Suggest automation rules that fit the described context.",
            r#"{"rules": [{"name": string, "condition": string, "action": string}]}"#,
        )
        .requires("context")
        .temperature(0.6),
    )
}
