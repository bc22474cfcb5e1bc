//! Custom Test Assertions
//!
//! Provides assertion helpers for response envelopes that give more
//! meaningful error messages than comparing JSON by hand.

use serde_json::Value;

use domain_vitals::Rating;

/// Asserts that a JSON body is a success envelope echoing `action`
///
/// # Panics
///
/// Panics if `success` is not true, the action differs, `data` is missing,
/// or `timestamp` is not a string.
pub fn assert_success_envelope(body: &Value, action: &str) {
    assert_eq!(body["success"], Value::Bool(true), "Expected success envelope, got {}", body);
    assert_eq!(
        body["action"].as_str(),
        Some(action),
        "Envelope action mismatch in {}",
        body
    );
    assert!(body.get("data").is_some(), "Success envelope without data: {}", body);
    assert!(body.get("error").is_none(), "Success envelope with error: {}", body);
    assert!(body["timestamp"].is_string(), "Envelope without timestamp: {}", body);
}

/// Asserts that a JSON body is a failure envelope whose error mentions `fragment`
pub fn assert_failure_envelope(body: &Value, fragment: &str) {
    assert_eq!(body["success"], Value::Bool(false), "Expected failure envelope, got {}", body);
    let error = body["error"]
        .as_str()
        .unwrap_or_else(|| panic!("Failure envelope without error string: {}", body));
    assert!(
        error.contains(fragment),
        "Error '{}' does not mention '{}'",
        error,
        fragment
    );
    assert!(body.get("data").is_none(), "Failure envelope with data: {}", body);
}

/// Asserts that extracted data fell back to the raw model text
pub fn assert_parse_error_data(data: &Value) {
    assert_eq!(data["parseError"], Value::Bool(true), "Expected parse-error data, got {}", data);
    assert!(data["rawResponse"].is_string(), "Parse-error data without raw text: {}", data);
}

/// Asserts the rating of a vitals summary body entry for `metric`
pub fn assert_metric_rating(ratings: &Value, metric: &str, expected: Rating) {
    let entry = ratings
        .as_array()
        .and_then(|list| list.iter().find(|r| r["metric"] == metric))
        .unwrap_or_else(|| panic!("No rating for {} in {}", metric, ratings));
    assert_eq!(
        entry["rating"].as_str(),
        Some(expected.as_str()),
        "Rating mismatch for {}",
        metric
    );
}
