//! Best-effort JSON extraction from model output
//!
//! Models wrap their JSON in prose or markdown fences often enough that the
//! reply is never parsed as-is. The outermost `{ ... }` span is taken instead,
//! and when even that fails the raw text is handed back flagged with
//! `parseError` rather than failing the request.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::warn;

static JSON_OBJECT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{[\s\S]*\}").expect("JSON object pattern is valid")
});

/// Result of extracting JSON from a completion
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Extracted {
    /// A JSON object was found and parsed
    Parsed(Value),
    /// Nothing parseable was found
    #[serde(rename_all = "camelCase")]
    Raw {
        raw_response: String,
        parse_error: bool,
    },
}

impl Extracted {
    fn raw(text: &str) -> Self {
        Extracted::Raw {
            raw_response: text.to_string(),
            parse_error: true,
        }
    }

    pub fn is_parse_error(&self) -> bool {
        matches!(self, Extracted::Raw { .. })
    }

    /// Converts into the value placed under `data` in the envelope
    pub fn into_data(self) -> Value {
        match self {
            Extracted::Parsed(value) => value,
            Extracted::Raw { raw_response, parse_error } => json!({
                "rawResponse": raw_response,
                "parseError": parse_error,
            }),
        }
    }
}

/// Extracts the outermost JSON object from `text`
pub fn extract_json(text: &str) -> Extracted {
    let Some(found) = JSON_OBJECT.find(text) else {
        warn!(length = text.len(), "No JSON object in completion");
        return Extracted::raw(text);
    };

    match serde_json::from_str::<Value>(found.as_str()) {
        Ok(value) => Extracted::Parsed(value),
        Err(e) => {
            warn!(error = %e, "Completion JSON did not parse");
            Extracted::raw(text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_object() {
        let extracted = extract_json(r#"{"summary": "ok"}"#);
        assert_eq!(extracted, Extracted::Parsed(json!({"summary": "ok"})));
    }

    #[test]
    fn test_object_inside_markdown_fence() {
        let text = "Here you go:\n```json\n{\"score\": 7, \"tags\": [\"a\"]}\n```\nThanks";
        let extracted = extract_json(text);
        assert_eq!(extracted, Extracted::Parsed(json!({"score": 7, "tags": ["a"]})));
    }

    #[test]
    fn test_nested_objects_span_first_to_last_brace() {
        let text = r#"Result: {"a": {"b": 1}, "c": {"d": 2}} done"#;
        let extracted = extract_json(text);
        assert_eq!(extracted, Extracted::Parsed(json!({"a": {"b": 1}, "c": {"d": 2}})));
    }

    #[test]
    fn test_no_object_falls_back_to_raw() {
        let extracted = extract_json("I cannot help with that.");
        assert!(extracted.is_parse_error());
        assert_eq!(
            extracted.into_data(),
            json!({"rawResponse": "I cannot help with that.", "parseError": true})
        );
    }

    #[test]
    fn test_two_separate_objects_fail_to_parse() {
        let extracted = extract_json(r#"{"a": 1} and {"b": 2}"#);
        assert!(extracted.is_parse_error());
    }

    #[test]
    fn test_truncated_object_falls_back() {
        let extracted = extract_json(r#"{"summary": "cut off"#);
        assert!(extracted.is_parse_error());
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn object_strategy() -> impl Strategy<Value = Value> {
            prop::collection::btree_map("[a-z]{1,8}", any::<i64>(), 0..6)
                .prop_map(|m| json!(m))
        }

        proptest! {
            #[test]
            fn object_survives_surrounding_prose(
                object in object_strategy(),
                before in "[^{}]{0,40}",
                after in "[^{}]{0,40}",
            ) {
                let text = format!("{}{}{}", before, object, after);
                prop_assert_eq!(extract_json(&text), Extracted::Parsed(object));
            }

            #[test]
            fn text_without_braces_is_returned_raw(text in "[^{}]{0,80}") {
                let data = extract_json(&text).into_data();
                prop_assert_eq!(&data["rawResponse"], &Value::String(text));
                prop_assert_eq!(&data["parseError"], &Value::Bool(true));
            }
        }
    }
}
