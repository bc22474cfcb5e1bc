//! Test Data Builders
//!
//! Provides builder patterns for constructing request bodies with sensible
//! defaults. Tests specify only the fields they care about.

use serde_json::{json, Map, Value};

use domain_actions::ActionRequest;

use crate::fixtures::{CompanyFixtures, StatementFixtures};

/// Builder for function call bodies
pub struct TestActionRequestBuilder {
    action: String,
    fields: Map<String, Value>,
}

impl TestActionRequestBuilder {
    /// Creates a builder for `action` with no fields
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            fields: Map::new(),
        }
    }

    /// `company-intelligence` / `analyze_company` on the fixed client
    pub fn analyze_company() -> Self {
        Self::new("analyze_company")
            .field("company_name", CompanyFixtures::ACME_NAME)
            .company(CompanyFixtures::acme())
    }

    /// `financial-analysis` / `ratio_analysis` on the sample statements
    pub fn ratio_analysis() -> Self {
        Self::new("ratio_analysis").statements(StatementFixtures::statements())
    }

    /// Sets the `company` field
    pub fn company(self, company: Value) -> Self {
        self.field("company", company)
    }

    /// Sets the `statements` field
    pub fn statements(self, statements: Value) -> Self {
        self.field("statements", statements)
    }

    /// Sets an arbitrary field
    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Removes a field
    pub fn without(mut self, name: &str) -> Self {
        self.fields.remove(name);
        self
    }

    /// Builds the domain request
    pub fn build(self) -> ActionRequest {
        ActionRequest {
            action: self.action,
            fields: self.fields,
        }
    }

    /// Builds the JSON body as the client posts it
    pub fn body(self) -> Value {
        let mut body = self.fields;
        body.insert("action".to_string(), Value::String(self.action));
        Value::Object(body)
    }
}

/// Builder for web vitals report bodies
#[derive(Default)]
pub struct TestVitalsReportBuilder {
    metrics: Vec<Value>,
    page: Option<String>,
}

impl TestVitalsReportBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one measurement
    pub fn metric(mut self, name: &str, value: f64) -> Self {
        self.metrics.push(json!({ "name": name, "value": value }));
        self
    }

    /// Sets the page path
    pub fn page(mut self, page: impl Into<String>) -> Self {
        self.page = Some(page.into());
        self
    }

    /// A report where every metric is in the good band
    pub fn all_good() -> Self {
        Self::new()
            .metric("LCP", 1200.0)
            .metric("FID", 40.0)
            .metric("CLS", 0.02)
            .metric("INP", 120.0)
    }

    pub fn body(self) -> Value {
        let mut body = json!({ "metrics": self.metrics });
        if let Some(page) = self.page {
            body["page"] = Value::String(page);
        }
        body
    }
}
