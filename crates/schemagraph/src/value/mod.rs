//! Glue over the `serde_json` value model
//!
//! The loader and validator only need a handful of capabilities from the
//! value model: classifying a node, comparing two nodes structurally, and
//! addressing nodes through JSON pointers. Those live here so the rest of the
//! crate never matches on raw number representations.
//!
//! Copyright (c) 2025 Schemagraph Authors
//! Licensed under the Apache-2.0 license

pub mod canonical;
pub mod pointer;

pub use canonical::{canonicalize, deep_equals, find_duplicate};
pub use pointer::{JsonPointer, PointerError};

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::fmt;

/// Kind of a JSON value as seen by keyword dispatch and type checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Null,
    Boolean,
    Number,
    String,
    Array,
    Object,
}

impl ValueKind {
    /// Classify a value
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Boolean,
            Value::Number(_) => ValueKind::Number,
            Value::String(_) => ValueKind::String,
            Value::Array(_) => ValueKind::Array,
            Value::Object(_) => ValueKind::Object,
        }
    }

    /// Keyword spelling used by the `type` keyword
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::Null => "null",
            ValueKind::Boolean => "boolean",
            ValueKind::Number => "number",
            ValueKind::String => "string",
            ValueKind::Array => "array",
            ValueKind::Object => "object",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a number has no fractional part, regardless of how it was written
pub fn is_integral(number: &Number) -> bool {
    if number.is_i64() || number.is_u64() {
        return true;
    }
    number
        .as_f64()
        .map(|f| f.is_finite() && f.fract() == 0.0)
        .unwrap_or(false)
}

/// Short description of a value for diagnostics, truncated for large values
pub fn describe(value: &Value) -> String {
    const LIMIT: usize = 64;
    let rendered = value.to_string();
    if rendered.chars().count() > LIMIT {
        let truncated: String = rendered.chars().take(LIMIT).collect();
        format!("{}...", truncated)
    } else {
        rendered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_classification() {
        assert_eq!(ValueKind::of(&json!(null)), ValueKind::Null);
        assert_eq!(ValueKind::of(&json!(true)), ValueKind::Boolean);
        assert_eq!(ValueKind::of(&json!(1.5)), ValueKind::Number);
        assert_eq!(ValueKind::of(&json!("a")), ValueKind::String);
        assert_eq!(ValueKind::of(&json!([1])), ValueKind::Array);
        assert_eq!(ValueKind::of(&json!({"a": 1})), ValueKind::Object);
        assert_eq!(ValueKind::Object.to_string(), "object");
    }

    fn number(value: Value) -> Number {
        match value {
            Value::Number(n) => n,
            other => panic!("not a number: {}", other),
        }
    }

    #[test]
    fn test_is_integral() {
        assert!(is_integral(&number(json!(1))));
        assert!(is_integral(&number(json!(1.0))));
        assert!(!is_integral(&number(json!(0.5))));
    }

    #[test]
    fn test_describe_truncates() {
        let long = Value::String("x".repeat(200));
        assert!(describe(&long).ends_with("..."));
        assert_eq!(describe(&json!([1, 2])), "[1,2]");
    }
}
