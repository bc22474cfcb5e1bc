//! Financial statement ratios
//!
//! Statement analysis actions do not trust the model with arithmetic. The
//! standard ratios are computed here with decimal precision and handed to
//! the model as fixed figures; they are also returned to the client
//! alongside the model's commentary.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ActionError;

/// Decimal places kept on every ratio
const RATIO_SCALE: u32 = 4;

/// One reporting period of a client's statements
///
/// Monetary fields are optional: banks often receive partial statements,
/// and a ratio with a missing input is reported as unavailable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialStatement {
    pub period: String,
    #[serde(default)]
    pub revenue: Option<Decimal>,
    #[serde(default)]
    pub net_income: Option<Decimal>,
    #[serde(default)]
    pub total_assets: Option<Decimal>,
    #[serde(default)]
    pub total_liabilities: Option<Decimal>,
    #[serde(default)]
    pub current_assets: Option<Decimal>,
    #[serde(default)]
    pub current_liabilities: Option<Decimal>,
    #[serde(default)]
    pub equity: Option<Decimal>,
}

/// Ratios for one period; `None` when an input is missing or a denominator is zero
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatioSet {
    pub period: String,
    pub current_ratio: Option<Decimal>,
    pub debt_to_equity: Option<Decimal>,
    pub net_margin: Option<Decimal>,
    pub return_on_assets: Option<Decimal>,
}

impl RatioSet {
    /// Renders with plain JSON numbers instead of decimal strings
    pub fn to_json(&self) -> Value {
        let num = |d: Option<Decimal>| d.and_then(|d| d.to_f64()).map(Value::from).unwrap_or(Value::Null);
        serde_json::json!({
            "period": self.period,
            "currentRatio": num(self.current_ratio),
            "debtToEquity": num(self.debt_to_equity),
            "netMargin": num(self.net_margin),
            "returnOnAssets": num(self.return_on_assets),
        })
    }
}

fn ratio(numerator: Option<Decimal>, denominator: Option<Decimal>) -> Option<Decimal> {
    let denominator = denominator?;
    if denominator.is_zero() {
        return None;
    }
    numerator?
        .checked_div(denominator)
        .map(|r| r.round_dp(RATIO_SCALE))
}

impl FinancialStatement {
    pub fn ratios(&self) -> RatioSet {
        RatioSet {
            period: self.period.clone(),
            current_ratio: ratio(self.current_assets, self.current_liabilities),
            debt_to_equity: ratio(self.total_liabilities, self.equity),
            net_margin: ratio(self.net_income, self.revenue),
            return_on_assets: ratio(self.net_income, self.total_assets),
        }
    }
}

/// Parses the `statements` field and computes ratios for every period
///
/// # Errors
///
/// Returns `ActionError::InvalidPayload` if `statements` is not an array of
/// statement objects.
pub fn compute_ratios(statements: &Value) -> Result<Vec<RatioSet>, ActionError> {
    if !statements.is_array() {
        return Err(ActionError::InvalidPayload(
            "statements must be an array".to_string(),
        ));
    }

    let parsed: Vec<FinancialStatement> = serde_json::from_value(statements.clone())
        .map_err(|e| ActionError::InvalidPayload(format!("statements: {}", e)))?;

    Ok(parsed.iter().map(FinancialStatement::ratios).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_ratios_for_complete_statement() {
        let statement = FinancialStatement {
            period: "2024".to_string(),
            revenue: Some(dec!(1000000)),
            net_income: Some(dec!(80000)),
            total_assets: Some(dec!(2000000)),
            total_liabilities: Some(dec!(1200000)),
            current_assets: Some(dec!(500000)),
            current_liabilities: Some(dec!(300000)),
            equity: Some(dec!(800000)),
        };

        let ratios = statement.ratios();

        assert_eq!(ratios.current_ratio, Some(dec!(1.6667)));
        assert_eq!(ratios.debt_to_equity, Some(dec!(1.5)));
        assert_eq!(ratios.net_margin, Some(dec!(0.08)));
        assert_eq!(ratios.return_on_assets, Some(dec!(0.04)));
    }

    #[test]
    fn test_zero_denominator_is_unavailable() {
        let statement = FinancialStatement {
            period: "2023".to_string(),
            revenue: Some(Decimal::ZERO),
            net_income: Some(dec!(10)),
            total_assets: None,
            total_liabilities: Some(dec!(5)),
            current_assets: Some(dec!(5)),
            current_liabilities: Some(dec!(0)),
            equity: Some(dec!(0)),
        };

        let ratios = statement.ratios();

        assert_eq!(ratios.current_ratio, None);
        assert_eq!(ratios.debt_to_equity, None);
        assert_eq!(ratios.net_margin, None);
        assert_eq!(ratios.return_on_assets, None);
    }

    #[test]
    fn test_compute_from_json_accepts_numbers_and_strings() {
        let statements = json!([
            {"period": "2023", "current_assets": 300, "current_liabilities": "200"},
            {"period": "2024", "net_income": 12.5, "revenue": 250}
        ]);

        let ratios = compute_ratios(&statements).unwrap();

        assert_eq!(ratios.len(), 2);
        assert_eq!(ratios[0].current_ratio, Some(dec!(1.5)));
        assert_eq!(ratios[1].net_margin, Some(dec!(0.05)));
        assert_eq!(ratios[1].to_json()["netMargin"], json!(0.05));
        assert_eq!(ratios[1].to_json()["currentRatio"], Value::Null);
    }

    #[test]
    fn test_compute_rejects_non_array() {
        let result = compute_ratios(&json!({"period": "2024"}));
        assert!(matches!(result, Err(ActionError::InvalidPayload(_))));
    }

    #[test]
    fn test_compute_rejects_bad_number() {
        let result = compute_ratios(&json!([{"period": "2024", "revenue": "lots"}]));
        assert!(matches!(result, Err(ActionError::InvalidPayload(_))));
    }
}
