//! Frozen schema variants
//!
//! Values here are only produced by the builders in [`super::builders`] and
//! expose read-only accessors; there is no mutation path after `build()`.
//!
//! Copyright (c) 2025 Schemagraph Authors
//! Licensed under the Apache-2.0 license

use super::SchemaId;
use crate::loader::formats::FormatValidator;
use regex::Regex;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Policy for items or properties not covered by an explicit schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Additional {
    #[default]
    Allow,
    Deny,
    Schema(SchemaId),
}

/// `enum`: the instance must deep-equal one of the stored literals
#[derive(Debug, Clone)]
pub struct EnumSchema {
    pub(super) values: Vec<Value>,
}

impl EnumSchema {
    pub fn values(&self) -> &[Value] {
        &self.values
    }
}

/// `const`: the instance must deep-equal the stored literal
#[derive(Debug, Clone)]
pub struct ConstSchema {
    pub(super) value: Value,
}

impl ConstSchema {
    pub fn value(&self) -> &Value {
        &self.value
    }
}

/// How array elements are matched to item schemas
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Items {
    /// One schema applied to every element
    All(SchemaId),
    /// Positional schemas; elements past the tuple fall to `additionalItems`
    Tuple(Vec<SchemaId>),
}

#[derive(Debug, Clone)]
pub struct ArraySchema {
    pub(super) min_items: Option<u64>,
    pub(super) max_items: Option<u64>,
    pub(super) unique_items: bool,
    pub(super) items: Option<Items>,
    pub(super) additional_items: Additional,
    pub(super) contains: Option<SchemaId>,
    pub(super) requires_array: bool,
}

impl ArraySchema {
    pub fn min_items(&self) -> Option<u64> {
        self.min_items
    }

    pub fn max_items(&self) -> Option<u64> {
        self.max_items
    }

    pub fn unique_items(&self) -> bool {
        self.unique_items
    }

    pub fn items(&self) -> Option<&Items> {
        self.items.as_ref()
    }

    pub fn all_items_schema(&self) -> Option<SchemaId> {
        match &self.items {
            Some(Items::All(id)) => Some(*id),
            _ => None,
        }
    }

    pub fn tuple_schemas(&self) -> Option<&[SchemaId]> {
        match &self.items {
            Some(Items::Tuple(ids)) => Some(ids),
            _ => None,
        }
    }

    pub fn additional_items(&self) -> Additional {
        self.additional_items
    }

    pub fn contains(&self) -> Option<SchemaId> {
        self.contains
    }

    pub fn requires_array(&self) -> bool {
        self.requires_array
    }

    pub(super) fn children(&self) -> Vec<SchemaId> {
        let mut ids = Vec::new();
        match &self.items {
            Some(Items::All(id)) => ids.push(*id),
            Some(Items::Tuple(tuple)) => ids.extend(tuple.iter().copied()),
            None => {}
        }
        if let Additional::Schema(id) = self.additional_items {
            ids.push(id);
        }
        ids.extend(self.contains);
        ids
    }
}

/// A `patternProperties` entry
#[derive(Debug, Clone)]
pub struct PatternProperty {
    pub(super) pattern: Regex,
    pub(super) schema: SchemaId,
}

impl PatternProperty {
    pub fn pattern(&self) -> &Regex {
        &self.pattern
    }

    pub fn schema(&self) -> SchemaId {
        self.schema
    }
}

/// A `dependencies` entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dependency {
    /// Presence of the key requires these keys too
    Properties(Vec<String>),
    /// Presence of the key requires the whole object to match this schema
    Schema(SchemaId),
}

#[derive(Debug, Clone)]
pub struct ObjectSchema {
    pub(super) properties: Vec<(String, SchemaId)>,
    pub(super) required: Vec<String>,
    pub(super) additional_properties: Additional,
    pub(super) pattern_properties: Vec<PatternProperty>,
    pub(super) min_properties: Option<u64>,
    pub(super) max_properties: Option<u64>,
    pub(super) property_names: Option<SchemaId>,
    pub(super) dependencies: Vec<(String, Dependency)>,
    pub(super) requires_object: bool,
}

impl ObjectSchema {
    /// Declared properties in declaration order
    pub fn properties(&self) -> &[(String, SchemaId)] {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<SchemaId> {
        self.properties
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, id)| *id)
    }

    pub fn required(&self) -> &[String] {
        &self.required
    }

    pub fn additional_properties(&self) -> Additional {
        self.additional_properties
    }

    pub fn pattern_properties(&self) -> &[PatternProperty] {
        &self.pattern_properties
    }

    pub fn min_properties(&self) -> Option<u64> {
        self.min_properties
    }

    pub fn max_properties(&self) -> Option<u64> {
        self.max_properties
    }

    pub fn property_names(&self) -> Option<SchemaId> {
        self.property_names
    }

    pub fn dependencies(&self) -> &[(String, Dependency)] {
        &self.dependencies
    }

    pub fn requires_object(&self) -> bool {
        self.requires_object
    }

    pub(super) fn children(&self) -> Vec<SchemaId> {
        let mut ids: Vec<SchemaId> = self.properties.iter().map(|(_, id)| *id).collect();
        ids.extend(self.pattern_properties.iter().map(|p| p.schema));
        if let Additional::Schema(id) = self.additional_properties {
            ids.push(id);
        }
        ids.extend(self.property_names);
        for (_, dependency) in &self.dependencies {
            if let Dependency::Schema(id) = dependency {
                ids.push(*id);
            }
        }
        ids
    }
}

/// A named format bound to its predicate at load time
#[derive(Clone)]
pub struct FormatCheck {
    pub(super) name: String,
    pub(super) validator: Arc<dyn FormatValidator>,
}

impl FormatCheck {
    pub fn new<N: Into<String>>(name: N, validator: Arc<dyn FormatValidator>) -> Self {
        Self {
            name: name.into(),
            validator,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_valid(&self, value: &str) -> bool {
        self.validator.is_valid(value)
    }
}

impl fmt::Debug for FormatCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormatCheck").field("name", &self.name).finish()
    }
}

#[derive(Debug, Clone)]
pub struct StringSchema {
    pub(super) min_length: Option<u64>,
    pub(super) max_length: Option<u64>,
    pub(super) pattern: Option<Regex>,
    pub(super) format: Option<FormatCheck>,
    pub(super) requires_string: bool,
}

impl StringSchema {
    pub fn min_length(&self) -> Option<u64> {
        self.min_length
    }

    pub fn max_length(&self) -> Option<u64> {
        self.max_length
    }

    pub fn pattern(&self) -> Option<&Regex> {
        self.pattern.as_ref()
    }

    pub fn format(&self) -> Option<&FormatCheck> {
        self.format.as_ref()
    }

    pub fn requires_string(&self) -> bool {
        self.requires_string
    }
}

#[derive(Debug, Clone)]
pub struct NumberSchema {
    pub(super) minimum: Option<f64>,
    pub(super) maximum: Option<f64>,
    pub(super) exclusive_minimum: Option<f64>,
    pub(super) exclusive_maximum: Option<f64>,
    pub(super) multiple_of: Option<f64>,
    pub(super) requires_number: bool,
    pub(super) requires_integer: bool,
}

impl NumberSchema {
    pub fn minimum(&self) -> Option<f64> {
        self.minimum
    }

    pub fn maximum(&self) -> Option<f64> {
        self.maximum
    }

    pub fn exclusive_minimum(&self) -> Option<f64> {
        self.exclusive_minimum
    }

    pub fn exclusive_maximum(&self) -> Option<f64> {
        self.exclusive_maximum
    }

    pub fn multiple_of(&self) -> Option<f64> {
        self.multiple_of
    }

    pub fn requires_number(&self) -> bool {
        self.requires_number
    }

    pub fn requires_integer(&self) -> bool {
        self.requires_integer
    }
}

/// Logical criterion of a combined schema
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Criterion {
    AllOf,
    AnyOf,
    OneOf,
}

impl Criterion {
    pub fn keyword(&self) -> &'static str {
        match self {
            Criterion::AllOf => "allOf",
            Criterion::AnyOf => "anyOf",
            Criterion::OneOf => "oneOf",
        }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

#[derive(Debug, Clone)]
pub struct CombinedSchema {
    pub(super) criterion: Criterion,
    pub(super) subschemas: Vec<SchemaId>,
    pub(super) synthetic: bool,
}

impl CombinedSchema {
    pub fn criterion(&self) -> Criterion {
        self.criterion
    }

    pub fn subschemas(&self) -> &[SchemaId] {
        &self.subschemas
    }

    /// True when the loader created this node to join sibling keyword
    /// groups rather than from an explicit `allOf`
    pub fn is_synthetic(&self) -> bool {
        self.synthetic
    }
}

#[derive(Debug, Clone, Copy)]
pub struct NotSchema {
    pub(super) negated: SchemaId,
}

impl NotSchema {
    pub fn new(negated: SchemaId) -> Self {
        Self { negated }
    }

    pub fn negated(&self) -> SchemaId {
        self.negated
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ConditionalSchema {
    pub(super) if_schema: SchemaId,
    pub(super) then_schema: Option<SchemaId>,
    pub(super) else_schema: Option<SchemaId>,
}

impl ConditionalSchema {
    pub fn if_schema(&self) -> SchemaId {
        self.if_schema
    }

    pub fn then_schema(&self) -> Option<SchemaId> {
        self.then_schema
    }

    pub fn else_schema(&self) -> Option<SchemaId> {
        self.else_schema
    }
}

/// `$ref`: delegates to the node in `target`
///
/// The target is an arena slot reserved before the referenced body is built,
/// which is what lets cyclic references load in one pass.
#[derive(Debug, Clone)]
pub struct ReferenceSchema {
    pub(super) reference: String,
    pub(super) canonical_uri: String,
    pub(super) target: SchemaId,
}

impl ReferenceSchema {
    pub fn new<R: Into<String>, C: Into<String>>(reference: R, canonical_uri: C, target: SchemaId) -> Self {
        Self {
            reference: reference.into(),
            canonical_uri: canonical_uri.into(),
            target,
        }
    }

    /// The `$ref` value as written
    pub fn reference(&self) -> &str {
        &self.reference
    }

    /// The registry key the reference resolved to
    pub fn canonical_uri(&self) -> &str {
        &self.canonical_uri
    }

    pub fn target(&self) -> SchemaId {
        self.target
    }
}
