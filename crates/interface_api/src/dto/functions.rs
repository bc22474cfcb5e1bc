//! Function catalog DTOs

use domain_actions::{ActionCatalog, FunctionSpec};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct FunctionSummary {
    pub name: String,
    pub actions: Vec<String>,
}

impl From<&FunctionSpec> for FunctionSummary {
    fn from(spec: &FunctionSpec) -> Self {
        Self {
            name: spec.name.clone(),
            actions: spec.action_names().into_iter().map(String::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FunctionListResponse {
    pub functions: Vec<FunctionSummary>,
}

impl From<&ActionCatalog> for FunctionListResponse {
    fn from(catalog: &ActionCatalog) -> Self {
        Self {
            functions: catalog.functions().map(FunctionSummary::from).collect(),
        }
    }
}
