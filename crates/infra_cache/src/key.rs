//! Query keys
//!
//! A query key is an ordered list of JSON segments such as
//! `["companies", 42, {"include": "contacts"}]`. Its identity is the compact
//! JSON text, which is stable because segments are compared in order.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::policy::DataCategory;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryKey(Vec<Value>);

impl QueryKey {
    pub fn new(segments: Vec<Value>) -> Self {
        Self(segments)
    }

    /// Builds a key from anything convertible to JSON values
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Value>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// Appends a segment
    pub fn with(mut self, segment: impl Into<Value>) -> Self {
        self.0.push(segment.into());
        self
    }

    pub fn segments(&self) -> &[Value] {
        &self.0
    }

    /// Compact JSON text used as the storage key
    pub fn identity(&self) -> String {
        Value::Array(self.0.clone()).to_string()
    }

    /// First segment when it is a string
    pub fn root(&self) -> Option<&str> {
        self.0.first().and_then(Value::as_str)
    }

    pub fn category(&self) -> DataCategory {
        self.root()
            .map(DataCategory::from_root)
            .unwrap_or(DataCategory::Default)
    }

    /// True if `prefix`'s segments are the leading segments of this key
    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.len() >= prefix.0.len() && self.0.iter().zip(&prefix.0).all(|(a, b)| a == b)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.identity())
    }
}
