//! Diagnostic model: violations, instance paths, and the failure wrapper
//!
//! Copyright (c) 2025 Schemagraph Authors
//! Licensed under the Apache-2.0 license

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// One step into an instance document
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathToken {
    Index(usize),
    Key(String),
}

impl fmt::Display for PathToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathToken::Index(index) => write!(f, "{}", index),
            PathToken::Key(key) => f.write_str(&key.replace('~', "~0").replace('/', "~1")),
        }
    }
}

impl From<usize> for PathToken {
    fn from(index: usize) -> Self {
        PathToken::Index(index)
    }
}

impl From<&str> for PathToken {
    fn from(key: &str) -> Self {
        PathToken::Key(key.to_string())
    }
}

/// Location of an instance node, rendered as `#/a/0`
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstancePath(Vec<PathToken>);

impl InstancePath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn tokens(&self) -> &[PathToken] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn push(&mut self, token: PathToken) {
        self.0.push(token);
    }

    pub(crate) fn pop(&mut self) {
        self.0.pop();
    }
}

impl<T: Into<PathToken>> FromIterator<T> for InstancePath {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for InstancePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("#")?;
        for token in &self.0 {
            write!(f, "/{}", token)?;
        }
        Ok(())
    }
}

/// Why a `oneOf` failed; the two failure modes are reported differently
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FailureReason {
    /// No branch matched; branch violations are attached as causes
    NoMatch,
    /// More than one branch matched
    Ambiguous { matching: Vec<usize> },
}

impl FailureReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureReason::NoMatch => "no_match",
            FailureReason::Ambiguous { .. } => "ambiguous",
        }
    }
}

/// A single constraint failure with its nested causes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    /// Instance node that failed
    pub path: InstancePath,
    /// Violated keyword, e.g. `minItems` or `oneOf`
    pub keyword: String,
    /// Human-readable message
    pub message: String,
    /// Schema node that produced the failure (`document#pointer`)
    pub schema_location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<FailureReason>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub causes: Vec<Violation>,
}

impl Violation {
    pub fn new<K, M, L>(path: InstancePath, keyword: K, message: M, schema_location: L) -> Self
    where
        K: Into<String>,
        M: Into<String>,
        L: Into<String>,
    {
        Self {
            path,
            keyword: keyword.into(),
            message: message.into(),
            schema_location: schema_location.into(),
            reason: None,
            causes: Vec::new(),
        }
    }

    pub fn with_causes(mut self, causes: Vec<Violation>) -> Self {
        self.causes = causes;
        self
    }

    pub fn with_reason(mut self, reason: FailureReason) -> Self {
        self.reason = Some(reason);
        self
    }

    /// Violations without nested causes, depth first
    pub fn leaves(&self) -> Vec<&Violation> {
        if self.causes.is_empty() {
            return vec![self];
        }
        self.causes.iter().flat_map(Violation::leaves).collect()
    }

    /// Every keyword in this tree, depth first, including this one
    pub fn keywords(&self) -> Vec<&str> {
        let mut keywords = vec![self.keyword.as_str()];
        for cause in &self.causes {
            keywords.extend(cause.keywords());
        }
        keywords
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Non-empty set of violations returned when an instance is invalid
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
pub struct ValidationFailure {
    pub violations: Vec<Violation>,
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.violations.as_slice() {
            [single] => write!(f, "{}", single),
            many => {
                write!(f, "#: {} schema violations found", many.len())?;
                for (i, violation) in many.iter().enumerate() {
                    write!(f, "\n{}. {}", i + 1, violation)?;
                }
                Ok(())
            }
        }
    }
}

impl ValidationFailure {
    /// `Ok` for an empty list, `Err` otherwise
    pub fn into_result(violations: Vec<Violation>) -> Result<(), Self> {
        if violations.is_empty() {
            Ok(())
        } else {
            Err(Self { violations })
        }
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn into_violations(self) -> Vec<Violation> {
        self.violations
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn leaf_count(&self) -> usize {
        self.violations.iter().map(|v| v.leaves().len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(keyword: &str) -> Violation {
        Violation::new(InstancePath::root(), keyword, "failed", "#")
    }

    #[test]
    fn test_instance_path_display() {
        let path: InstancePath = vec![PathToken::from("a/b"), PathToken::from(0)]
            .into_iter()
            .collect();
        assert_eq!(path.to_string(), "#/a~1b/0");
        assert_eq!(InstancePath::root().to_string(), "#");
    }

    #[test]
    fn test_leaves_walk_nested_causes() {
        let tree = leaf("anyOf").with_causes(vec![
            leaf("type"),
            leaf("then").with_causes(vec![leaf("minLength"), leaf("pattern")]),
        ]);
        let keywords: Vec<&str> = tree.leaves().iter().map(|v| v.keyword.as_str()).collect();
        assert_eq!(keywords, vec!["type", "minLength", "pattern"]);
        assert_eq!(tree.keywords().len(), 5);
    }

    #[test]
    fn test_failure_display_and_result() {
        assert!(ValidationFailure::into_result(Vec::new()).is_ok());

        let single = ValidationFailure::into_result(vec![leaf("enum")]).unwrap_err();
        assert_eq!(single.to_string(), "#: failed");

        let many = ValidationFailure::into_result(vec![leaf("a"), leaf("b")]).unwrap_err();
        assert!(many.to_string().starts_with("#: 2 schema violations found"));
        assert_eq!(many.leaf_count(), 2);
    }

    #[test]
    fn test_violation_serialization_shape() {
        let violation = Violation::new(
            vec![PathToken::from("items"), PathToken::from(2)].into_iter().collect(),
            "oneOf",
            "2 subschemas matched instead of one",
            "#/properties/items",
        )
        .with_reason(FailureReason::Ambiguous { matching: vec![0, 1] });

        let json = serde_json::to_value(&violation).unwrap();
        assert_eq!(json["path"], serde_json::json!(["items", 2]));
        assert_eq!(json["reason"]["kind"], "ambiguous");
        assert_eq!(json["reason"]["matching"], serde_json::json!([0, 1]));
        assert!(json.get("causes").is_none());
    }
}
