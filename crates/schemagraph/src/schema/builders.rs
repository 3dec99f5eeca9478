//! Mutable staging builders for schema variants
//!
//! Each builder is consumed exactly once by `build()`, which checks the
//! variant's invariants and returns the frozen value.
//!
//! Copyright (c) 2025 Schemagraph Authors
//! Licensed under the Apache-2.0 license

use super::variants::{
    Additional, ArraySchema, CombinedSchema, ConditionalSchema, ConstSchema, Criterion,
    Dependency, EnumSchema, FormatCheck, Items, NumberSchema, ObjectSchema, PatternProperty,
    StringSchema,
};
use super::SchemaId;
use crate::value::canonicalize;
use regex::Regex;
use serde_json::Value;
use thiserror::Error;

/// Invariant violations detected while freezing a builder
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BuildError {
    #[error("{min_keyword} ({min}) must not exceed {max_keyword} ({max})")]
    InvertedRange {
        min_keyword: &'static str,
        max_keyword: &'static str,
        min: u64,
        max: u64,
    },

    #[error("'{keyword}' must not be empty")]
    Empty { keyword: &'static str },

    #[error("'items' cannot be both a single schema and a list of schemas")]
    ConflictingItems,

    #[error("'{keyword}' must be strictly greater than 0, found {value}")]
    NonPositive { keyword: &'static str, value: f64 },
}

fn check_range(
    min_keyword: &'static str,
    min: Option<u64>,
    max_keyword: &'static str,
    max: Option<u64>,
) -> Result<(), BuildError> {
    match (min, max) {
        (Some(min), Some(max)) if min > max => Err(BuildError::InvertedRange {
            min_keyword,
            max_keyword,
            min,
            max,
        }),
        _ => Ok(()),
    }
}

impl EnumSchema {
    pub fn builder() -> EnumSchemaBuilder {
        EnumSchemaBuilder::default()
    }
}

#[derive(Debug, Default)]
pub struct EnumSchemaBuilder {
    values: Vec<Value>,
}

impl EnumSchemaBuilder {
    pub fn possible_value(mut self, value: Value) -> Self {
        self.values.push(value);
        self
    }

    pub fn possible_values<I: IntoIterator<Item = Value>>(mut self, values: I) -> Self {
        self.values.extend(values);
        self
    }

    pub fn build(self) -> Result<EnumSchema, BuildError> {
        if self.values.is_empty() {
            return Err(BuildError::Empty { keyword: "enum" });
        }
        Ok(EnumSchema {
            values: self.values.iter().map(canonicalize).collect(),
        })
    }
}

impl ConstSchema {
    pub fn new(value: &Value) -> Self {
        Self {
            value: canonicalize(value),
        }
    }
}

impl ArraySchema {
    pub fn builder() -> ArraySchemaBuilder {
        ArraySchemaBuilder::default()
    }
}

#[derive(Debug, Default)]
pub struct ArraySchemaBuilder {
    min_items: Option<u64>,
    max_items: Option<u64>,
    unique_items: bool,
    all_items: Option<SchemaId>,
    tuple: Option<Vec<SchemaId>>,
    additional_items: Additional,
    contains: Option<SchemaId>,
    requires_array: bool,
}

impl ArraySchemaBuilder {
    pub fn min_items(mut self, min: u64) -> Self {
        self.min_items = Some(min);
        self
    }

    pub fn max_items(mut self, max: u64) -> Self {
        self.max_items = Some(max);
        self
    }

    pub fn unique_items(mut self, unique: bool) -> Self {
        self.unique_items = unique;
        self
    }

    pub fn all_items_schema(mut self, schema: SchemaId) -> Self {
        self.all_items = Some(schema);
        self
    }

    /// Append a positional schema, switching the builder to tuple mode
    pub fn add_item_schema(mut self, schema: SchemaId) -> Self {
        self.tuple.get_or_insert_with(Vec::new).push(schema);
        self
    }

    pub fn additional_items(mut self, allowed: bool) -> Self {
        self.additional_items = if allowed {
            Additional::Allow
        } else {
            Additional::Deny
        };
        self
    }

    pub fn schema_of_additional_items(mut self, schema: SchemaId) -> Self {
        self.additional_items = Additional::Schema(schema);
        self
    }

    pub fn contains(mut self, schema: SchemaId) -> Self {
        self.contains = Some(schema);
        self
    }

    pub fn requires_array(mut self, requires: bool) -> Self {
        self.requires_array = requires;
        self
    }

    pub fn build(self) -> Result<ArraySchema, BuildError> {
        check_range("minItems", self.min_items, "maxItems", self.max_items)?;
        let items = match (self.all_items, self.tuple) {
            (Some(_), Some(_)) => return Err(BuildError::ConflictingItems),
            (Some(all), None) => Some(Items::All(all)),
            (None, Some(tuple)) => Some(Items::Tuple(tuple)),
            (None, None) => None,
        };
        Ok(ArraySchema {
            min_items: self.min_items,
            max_items: self.max_items,
            unique_items: self.unique_items,
            items,
            additional_items: self.additional_items,
            contains: self.contains,
            requires_array: self.requires_array,
        })
    }
}

impl ObjectSchema {
    pub fn builder() -> ObjectSchemaBuilder {
        ObjectSchemaBuilder::default()
    }
}

#[derive(Debug, Default)]
pub struct ObjectSchemaBuilder {
    properties: Vec<(String, SchemaId)>,
    required: Vec<String>,
    additional_properties: Additional,
    pattern_properties: Vec<PatternProperty>,
    min_properties: Option<u64>,
    max_properties: Option<u64>,
    property_names: Option<SchemaId>,
    dependencies: Vec<(String, Dependency)>,
    requires_object: bool,
}

impl ObjectSchemaBuilder {
    pub fn add_property<N: Into<String>>(mut self, name: N, schema: SchemaId) -> Self {
        self.properties.push((name.into(), schema));
        self
    }

    pub fn add_required<N: Into<String>>(mut self, name: N) -> Self {
        let name = name.into();
        if !self.required.contains(&name) {
            self.required.push(name);
        }
        self
    }

    pub fn additional_properties(mut self, allowed: bool) -> Self {
        self.additional_properties = if allowed {
            Additional::Allow
        } else {
            Additional::Deny
        };
        self
    }

    pub fn schema_of_additional_properties(mut self, schema: SchemaId) -> Self {
        self.additional_properties = Additional::Schema(schema);
        self
    }

    pub fn pattern_property(mut self, pattern: Regex, schema: SchemaId) -> Self {
        self.pattern_properties.push(PatternProperty { pattern, schema });
        self
    }

    pub fn min_properties(mut self, min: u64) -> Self {
        self.min_properties = Some(min);
        self
    }

    pub fn max_properties(mut self, max: u64) -> Self {
        self.max_properties = Some(max);
        self
    }

    pub fn property_names(mut self, schema: SchemaId) -> Self {
        self.property_names = Some(schema);
        self
    }

    pub fn property_dependency<N: Into<String>>(mut self, name: N, required: Vec<String>) -> Self {
        self.dependencies
            .push((name.into(), Dependency::Properties(required)));
        self
    }

    pub fn schema_dependency<N: Into<String>>(mut self, name: N, schema: SchemaId) -> Self {
        self.dependencies.push((name.into(), Dependency::Schema(schema)));
        self
    }

    pub fn requires_object(mut self, requires: bool) -> Self {
        self.requires_object = requires;
        self
    }

    pub fn build(self) -> Result<ObjectSchema, BuildError> {
        check_range(
            "minProperties",
            self.min_properties,
            "maxProperties",
            self.max_properties,
        )?;
        Ok(ObjectSchema {
            properties: self.properties,
            required: self.required,
            additional_properties: self.additional_properties,
            pattern_properties: self.pattern_properties,
            min_properties: self.min_properties,
            max_properties: self.max_properties,
            property_names: self.property_names,
            dependencies: self.dependencies,
            requires_object: self.requires_object,
        })
    }
}

impl StringSchema {
    pub fn builder() -> StringSchemaBuilder {
        StringSchemaBuilder::default()
    }
}

#[derive(Debug, Default)]
pub struct StringSchemaBuilder {
    min_length: Option<u64>,
    max_length: Option<u64>,
    pattern: Option<Regex>,
    format: Option<FormatCheck>,
    requires_string: bool,
}

impl StringSchemaBuilder {
    pub fn min_length(mut self, min: u64) -> Self {
        self.min_length = Some(min);
        self
    }

    pub fn max_length(mut self, max: u64) -> Self {
        self.max_length = Some(max);
        self
    }

    pub fn pattern(mut self, pattern: Regex) -> Self {
        self.pattern = Some(pattern);
        self
    }

    pub fn format(mut self, format: FormatCheck) -> Self {
        self.format = Some(format);
        self
    }

    pub fn requires_string(mut self, requires: bool) -> Self {
        self.requires_string = requires;
        self
    }

    pub fn build(self) -> Result<StringSchema, BuildError> {
        check_range("minLength", self.min_length, "maxLength", self.max_length)?;
        Ok(StringSchema {
            min_length: self.min_length,
            max_length: self.max_length,
            pattern: self.pattern,
            format: self.format,
            requires_string: self.requires_string,
        })
    }
}

impl NumberSchema {
    pub fn builder() -> NumberSchemaBuilder {
        NumberSchemaBuilder::default()
    }
}

#[derive(Debug, Default)]
pub struct NumberSchemaBuilder {
    minimum: Option<f64>,
    maximum: Option<f64>,
    exclusive_minimum: Option<f64>,
    exclusive_maximum: Option<f64>,
    multiple_of: Option<f64>,
    requires_number: bool,
    requires_integer: bool,
}

impl NumberSchemaBuilder {
    pub fn minimum(mut self, minimum: f64) -> Self {
        self.minimum = Some(minimum);
        self
    }

    pub fn maximum(mut self, maximum: f64) -> Self {
        self.maximum = Some(maximum);
        self
    }

    pub fn exclusive_minimum(mut self, limit: f64) -> Self {
        self.exclusive_minimum = Some(limit);
        self
    }

    pub fn exclusive_maximum(mut self, limit: f64) -> Self {
        self.exclusive_maximum = Some(limit);
        self
    }

    pub fn multiple_of(mut self, divisor: f64) -> Self {
        self.multiple_of = Some(divisor);
        self
    }

    pub fn requires_number(mut self, requires: bool) -> Self {
        self.requires_number = requires;
        self
    }

    /// Integer-only; implies `requires_number`
    pub fn requires_integer(mut self, requires: bool) -> Self {
        self.requires_integer = requires;
        if requires {
            self.requires_number = true;
        }
        self
    }

    pub fn build(self) -> Result<NumberSchema, BuildError> {
        if let Some(divisor) = self.multiple_of {
            if divisor <= 0.0 || !divisor.is_finite() {
                return Err(BuildError::NonPositive {
                    keyword: "multipleOf",
                    value: divisor,
                });
            }
        }
        Ok(NumberSchema {
            minimum: self.minimum,
            maximum: self.maximum,
            exclusive_minimum: self.exclusive_minimum,
            exclusive_maximum: self.exclusive_maximum,
            multiple_of: self.multiple_of,
            requires_number: self.requires_number,
            requires_integer: self.requires_integer,
        })
    }
}

impl CombinedSchema {
    pub fn builder(criterion: Criterion) -> CombinedSchemaBuilder {
        CombinedSchemaBuilder {
            criterion,
            subschemas: Vec::new(),
            synthetic: false,
        }
    }

    pub fn all_of(subschemas: Vec<SchemaId>) -> Result<Self, BuildError> {
        Self::builder(Criterion::AllOf).subschemas(subschemas).build()
    }

    pub fn any_of(subschemas: Vec<SchemaId>) -> Result<Self, BuildError> {
        Self::builder(Criterion::AnyOf).subschemas(subschemas).build()
    }

    pub fn one_of(subschemas: Vec<SchemaId>) -> Result<Self, BuildError> {
        Self::builder(Criterion::OneOf).subschemas(subschemas).build()
    }
}

#[derive(Debug)]
pub struct CombinedSchemaBuilder {
    criterion: Criterion,
    subschemas: Vec<SchemaId>,
    synthetic: bool,
}

impl CombinedSchemaBuilder {
    pub fn subschema(mut self, schema: SchemaId) -> Self {
        self.subschemas.push(schema);
        self
    }

    pub fn subschemas<I: IntoIterator<Item = SchemaId>>(mut self, schemas: I) -> Self {
        self.subschemas.extend(schemas);
        self
    }

    pub fn synthetic(mut self, synthetic: bool) -> Self {
        self.synthetic = synthetic;
        self
    }

    pub fn build(self) -> Result<CombinedSchema, BuildError> {
        if self.subschemas.is_empty() {
            return Err(BuildError::Empty {
                keyword: self.criterion.keyword(),
            });
        }
        Ok(CombinedSchema {
            criterion: self.criterion,
            subschemas: self.subschemas,
            synthetic: self.synthetic,
        })
    }
}

impl ConditionalSchema {
    pub fn builder(if_schema: SchemaId) -> ConditionalSchemaBuilder {
        ConditionalSchemaBuilder {
            if_schema,
            then_schema: None,
            else_schema: None,
        }
    }
}

#[derive(Debug)]
pub struct ConditionalSchemaBuilder {
    if_schema: SchemaId,
    then_schema: Option<SchemaId>,
    else_schema: Option<SchemaId>,
}

impl ConditionalSchemaBuilder {
    pub fn then_schema(mut self, schema: SchemaId) -> Self {
        self.then_schema = Some(schema);
        self
    }

    pub fn else_schema(mut self, schema: SchemaId) -> Self {
        self.else_schema = Some(schema);
        self
    }

    pub fn build(self) -> ConditionalSchema {
        ConditionalSchema {
            if_schema: self.if_schema,
            then_schema: self.then_schema,
            else_schema: self.else_schema,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_enum_requires_values_and_canonicalizes() {
        assert_eq!(
            EnumSchema::builder().build().unwrap_err(),
            BuildError::Empty { keyword: "enum" }
        );
        let schema = EnumSchema::builder()
            .possible_value(json!(2.0))
            .possible_value(json!({"a": [1.0]}))
            .build()
            .unwrap();
        assert_eq!(schema.values(), &[json!(2), json!({"a": [1]})]);
    }

    #[test]
    fn test_array_items_modes_are_exclusive() {
        let err = ArraySchema::builder()
            .all_items_schema(SchemaId::new(0))
            .add_item_schema(SchemaId::new(1))
            .build()
            .unwrap_err();
        assert_eq!(err, BuildError::ConflictingItems);

        let tuple = ArraySchema::builder()
            .add_item_schema(SchemaId::new(0))
            .add_item_schema(SchemaId::new(1))
            .additional_items(false)
            .build()
            .unwrap();
        assert_eq!(tuple.tuple_schemas(), Some(&[SchemaId::new(0), SchemaId::new(1)][..]));
        assert_eq!(tuple.all_items_schema(), None);
        assert_eq!(tuple.additional_items(), Additional::Deny);
    }

    #[test]
    fn test_inverted_ranges_are_rejected() {
        let err = ArraySchema::builder().min_items(3).max_items(1).build().unwrap_err();
        assert!(matches!(err, BuildError::InvertedRange { min: 3, max: 1, .. }));
        assert!(StringSchema::builder().min_length(2).max_length(1).build().is_err());
        assert!(ObjectSchema::builder().min_properties(1).max_properties(1).build().is_ok());
    }

    #[test]
    fn test_number_builder() {
        assert!(matches!(
            NumberSchema::builder().multiple_of(0.0).build(),
            Err(BuildError::NonPositive { keyword: "multipleOf", .. })
        ));
        let integer = NumberSchema::builder().requires_integer(true).build().unwrap();
        assert!(integer.requires_number());
        assert!(integer.requires_integer());
    }

    #[test]
    fn test_combined_requires_subschemas() {
        assert_eq!(
            CombinedSchema::one_of(Vec::new()).unwrap_err(),
            BuildError::Empty { keyword: "oneOf" }
        );
        let combined = CombinedSchema::builder(Criterion::AllOf)
            .subschema(SchemaId::new(4))
            .synthetic(true)
            .build()
            .unwrap();
        assert!(combined.is_synthetic());
        assert_eq!(combined.criterion(), Criterion::AllOf);
    }

    #[test]
    fn test_required_deduplicates() {
        let object = ObjectSchema::builder()
            .add_required("a")
            .add_required("a")
            .add_required("b")
            .build()
            .unwrap();
        assert_eq!(object.required(), &["a".to_string(), "b".to_string()]);
    }
}
