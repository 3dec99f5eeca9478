//! Traversal state and variant dispatch
//!
//! Copyright (c) 2025 Schemagraph Authors
//! Licensed under the Apache-2.0 license

use super::error::{FailureReason, InstancePath, PathToken, Violation};
use super::AggregationMode;
use crate::schema::{
    CombinedSchema, ConditionalSchema, Criterion, ReferenceSchema, Schema, SchemaGraph, SchemaId,
    SchemaLocation,
};
use crate::value::ValueKind;
use serde_json::Value;

/// Per-call state of one validation run
///
/// Holds the current instance path and the stack of active reference
/// targets. A reference whose target is already being evaluated against the
/// very same instance node adds no new constraint, so that inner visit is
/// treated as satisfied; this is what keeps cycles such as
/// `{"allOf": [{"$ref": "#"}]}` finite.
pub struct ValidationContext<'g> {
    graph: &'g SchemaGraph,
    mode: AggregationMode,
    path: InstancePath,
    active_references: Vec<(SchemaId, *const Value)>,
}

impl<'g> ValidationContext<'g> {
    pub fn new(graph: &'g SchemaGraph, mode: AggregationMode) -> Self {
        Self {
            graph,
            mode,
            path: InstancePath::root(),
            active_references: Vec::new(),
        }
    }

    pub fn mode(&self) -> AggregationMode {
        self.mode
    }

    pub fn path(&self) -> &InstancePath {
        &self.path
    }

    /// Validate `instance` against node `id`, returning every violation (or
    /// only the first one in fail-fast mode)
    pub fn validate(&mut self, id: SchemaId, instance: &Value) -> Vec<Violation> {
        let graph = self.graph;
        let node = graph.node(id);
        let location = &node.metadata.location;

        match &node.schema {
            Schema::Empty => Vec::new(),
            Schema::False => vec![self.violation(location, "false", "no value is allowed here")],
            Schema::Enum(schema) => self.validate_enum(schema, location, instance),
            Schema::Const(schema) => self.validate_const(schema, location, instance),
            Schema::Array(schema) => self.validate_array(schema, location, instance),
            Schema::Object(schema) => self.validate_object(schema, location, instance),
            Schema::String(schema) => self.validate_string(schema, location, instance),
            Schema::Number(schema) => self.validate_number(schema, location, instance),
            Schema::Boolean => self.require_kind(ValueKind::Boolean, location, instance),
            Schema::Null => self.require_kind(ValueKind::Null, location, instance),
            Schema::Not(schema) => {
                if self.matches(schema.negated(), instance) {
                    vec![self.violation(location, "not", "subject must not be valid against schema")]
                } else {
                    Vec::new()
                }
            }
            Schema::Combined(schema) => self.validate_combined(schema, location, instance),
            Schema::Conditional(schema) => self.validate_conditional(schema, location, instance),
            Schema::Reference(schema) => self.validate_reference(schema, instance),
        }
    }

    /// Validate a child instance node reached through `token`
    pub(super) fn descend(&mut self, token: PathToken, id: SchemaId, instance: &Value) -> Vec<Violation> {
        self.path.push(token);
        let violations = self.validate(id, instance);
        self.path.pop();
        violations
    }

    /// Pass/fail probe; runs fail-fast regardless of the configured mode
    pub(super) fn matches(&mut self, id: SchemaId, instance: &Value) -> bool {
        let mode = std::mem::replace(&mut self.mode, AggregationMode::FailFast);
        let matched = self.validate(id, instance).is_empty();
        self.mode = mode;
        matched
    }

    /// Whether collection should stop now
    pub(super) fn should_stop(&self, violations: &[Violation]) -> bool {
        self.mode == AggregationMode::FailFast && !violations.is_empty()
    }

    pub(super) fn violation<K: Into<String>, M: Into<String>>(
        &self,
        location: &SchemaLocation,
        keyword: K,
        message: M,
    ) -> Violation {
        Violation::new(self.path.clone(), keyword, message, location.to_string())
    }

    pub(super) fn type_violation(
        &self,
        location: &SchemaLocation,
        expected: &str,
        instance: &Value,
    ) -> Violation {
        self.violation(
            location,
            "type",
            format!(
                "expected type: {}, found: {}",
                expected,
                ValueKind::of(instance)
            ),
        )
    }

    fn require_kind(&self, kind: ValueKind, location: &SchemaLocation, instance: &Value) -> Vec<Violation> {
        if ValueKind::of(instance) == kind {
            Vec::new()
        } else {
            vec![self.type_violation(location, kind.as_str(), instance)]
        }
    }

    fn validate_combined(
        &mut self,
        schema: &CombinedSchema,
        location: &SchemaLocation,
        instance: &Value,
    ) -> Vec<Violation> {
        let subschemas = schema.subschemas();
        match schema.criterion() {
            Criterion::AllOf => {
                let mut violations = Vec::new();
                for &id in subschemas {
                    violations.extend(self.validate(id, instance));
                    if self.should_stop(&violations) {
                        break;
                    }
                }
                violations
            }
            Criterion::AnyOf => {
                let mut causes = Vec::new();
                for &id in subschemas {
                    let branch = self.validate(id, instance);
                    if branch.is_empty() {
                        return Vec::new();
                    }
                    causes.extend(branch);
                }
                vec![self
                    .violation(
                        location,
                        "anyOf",
                        format!(
                            "no subschema matched out of the total {} subschemas",
                            subschemas.len()
                        ),
                    )
                    .with_causes(causes)]
            }
            Criterion::OneOf => {
                let mut matching = Vec::new();
                let mut causes = Vec::new();
                for (index, &id) in subschemas.iter().enumerate() {
                    let branch = self.validate(id, instance);
                    if branch.is_empty() {
                        matching.push(index);
                    } else {
                        causes.extend(branch);
                    }
                }
                match matching.len() {
                    1 => Vec::new(),
                    0 => vec![self
                        .violation(
                            location,
                            "oneOf",
                            format!(
                                "no subschema matched out of the total {} subschemas",
                                subschemas.len()
                            ),
                        )
                        .with_reason(FailureReason::NoMatch)
                        .with_causes(causes)],
                    count => vec![self
                        .violation(
                            location,
                            "oneOf",
                            format!(
                                "{} subschemas matched instead of one (indices {:?})",
                                count, matching
                            ),
                        )
                        .with_reason(FailureReason::Ambiguous { matching })],
                }
            }
        }
    }

    fn validate_conditional(
        &mut self,
        schema: &ConditionalSchema,
        location: &SchemaLocation,
        instance: &Value,
    ) -> Vec<Violation> {
        let (keyword, branch) = if self.matches(schema.if_schema(), instance) {
            ("then", schema.then_schema())
        } else {
            ("else", schema.else_schema())
        };
        let Some(branch) = branch else {
            return Vec::new();
        };

        let causes = self.validate(branch, instance);
        if causes.is_empty() {
            return Vec::new();
        }
        vec![self
            .violation(
                location,
                keyword,
                format!("input is invalid against the \"{}\" schema", keyword),
            )
            .with_causes(causes)]
    }

    fn validate_reference(&mut self, schema: &ReferenceSchema, instance: &Value) -> Vec<Violation> {
        let key = (schema.target(), instance as *const Value);
        if self.active_references.contains(&key) {
            return Vec::new();
        }
        self.active_references.push(key);
        let violations = self.validate(schema.target(), instance);
        self.active_references.pop();
        violations
    }
}
