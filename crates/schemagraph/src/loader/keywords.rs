//! Keyword-group sub-loaders
//!
//! Each group of related keywords present on a schema object becomes one
//! node. Primitive groups (array, object, string, number) only constrain
//! instances of their own kind unless `type` demands that kind.
//!
//! Copyright (c) 2025 Schemagraph Authors
//! Licensed under the Apache-2.0 license

use crate::loader::error::{LoadError, LoadResult};
use crate::loader::narrowing::{require, KindDispatch, SCHEMA_KINDS};
use crate::loader::schema_loader::{Frame, LoadingState, MultiTypePolicy};
use crate::schema::{
    Additional, ArraySchema, CombinedSchema, ConditionalSchema, ConstSchema, Criterion,
    Dependency, EnumSchema, FormatCheck, Items, NotSchema, NumberSchema, ObjectSchema, Schema, SchemaId,
    SchemaLocation, StringSchema,
};
use crate::value::{is_integral, ValueKind};
use regex::Regex;
use serde_json::{Map, Value};

type Object = Map<String, Value>;

const ARRAY_KEYWORDS: &[&str] = &[
    "minItems",
    "maxItems",
    "uniqueItems",
    "items",
    "additionalItems",
    "contains",
];
const OBJECT_KEYWORDS: &[&str] = &[
    "properties",
    "required",
    "additionalProperties",
    "patternProperties",
    "minProperties",
    "maxProperties",
    "propertyNames",
    "dependencies",
];
const STRING_KEYWORDS: &[&str] = &["minLength", "maxLength", "pattern", "format"];
const NUMBER_KEYWORDS: &[&str] = &[
    "minimum",
    "maximum",
    "exclusiveMinimum",
    "exclusiveMaximum",
    "multipleOf",
];

/// Primitive type names accepted by `type`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TypeName {
    String,
    Number,
    Integer,
    Boolean,
    Null,
    Array,
    Object,
}

impl TypeName {
    fn parse(name: &str) -> Option<Self> {
        Some(match name {
            "string" => TypeName::String,
            "number" => TypeName::Number,
            "integer" => TypeName::Integer,
            "boolean" => TypeName::Boolean,
            "null" => TypeName::Null,
            "array" => TypeName::Array,
            "object" => TypeName::Object,
            _ => return None,
        })
    }

    fn group(&self) -> &'static str {
        match self {
            TypeName::String => "string",
            TypeName::Number | TypeName::Integer => "number",
            TypeName::Boolean => "boolean",
            TypeName::Null => "null",
            TypeName::Array => "array",
            TypeName::Object => "object",
        }
    }
}

enum TypeDeclaration {
    Single(TypeName),
    Many(Vec<TypeName>),
}

fn has_any(object: &Object, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| object.contains_key(*k))
}

/// Index of the first of `keywords` in declaration order
fn position(object: &Object, keywords: &[&str]) -> usize {
    object
        .keys()
        .position(|key| keywords.contains(&key.as_str()))
        .unwrap_or(usize::MAX)
}

fn group_keywords(group: &str) -> &'static [&'static str] {
    match group {
        "array" => ARRAY_KEYWORDS,
        "object" => OBJECT_KEYWORDS,
        "string" => STRING_KEYWORDS,
        "number" => NUMBER_KEYWORDS,
        _ => &[],
    }
}

impl<'l> LoadingState<'l> {
    /// Build one schema per keyword group present on `object`, ordered by
    /// where each group's first keyword is declared
    pub(crate) fn load_groups(
        &mut self,
        object: &Object,
        frame: &Frame,
        location: &SchemaLocation,
    ) -> LoadResult<Vec<Schema>> {
        let mut groups: Vec<(usize, Schema)> = Vec::new();

        if let Some(values) = object.get("enum") {
            let values = require("enum", values, location, ValueKind::Array)?;
            let schema = EnumSchema::builder()
                .possible_values(values.as_array().into_iter().flatten().cloned())
                .build()
                .map_err(|e| LoadError::from_build(location, e))?;
            groups.push((position(object, &["enum"]), Schema::Enum(schema)));
        }
        if let Some(value) = object.get("const") {
            groups.push((position(object, &["const"]), Schema::Const(ConstSchema::new(value))));
        }

        groups.extend(self.load_typed_groups(object, frame, location)?);

        for criterion in [Criterion::AllOf, Criterion::AnyOf, Criterion::OneOf] {
            let keyword = criterion.keyword();
            if let Some(value) = object.get(keyword) {
                let subschemas = self.load_schema_array(keyword, value, frame, location)?;
                let schema = CombinedSchema::builder(criterion)
                    .subschemas(subschemas)
                    .build()
                    .map_err(|e| LoadError::from_build(location, e))?;
                groups.push((position(object, &[keyword]), Schema::Combined(schema)));
            }
        }

        if let Some(value) = object.get("$ref") {
            let reference = require("$ref", value, location, ValueKind::String)?
                .as_str()
                .unwrap_or_default();
            let schema = self.load_reference(reference, frame, location)?;
            groups.push((position(object, &["$ref"]), schema));
        }

        if let Some(value) = object.get("not") {
            let negated = self.load_keyword_schema("not", value, frame.child("not"), location)?;
            groups.push((position(object, &["not"]), Schema::Not(NotSchema::new(negated))));
        }

        if let Some(value) = object.get("if") {
            let if_schema = self.load_keyword_schema("if", value, frame.child("if"), location)?;
            let mut builder = ConditionalSchema::builder(if_schema);
            if let Some(value) = object.get("then") {
                builder = builder.then_schema(self.load_keyword_schema(
                    "then",
                    value,
                    frame.child("then"),
                    location,
                )?);
            }
            if let Some(value) = object.get("else") {
                builder = builder.else_schema(self.load_keyword_schema(
                    "else",
                    value,
                    frame.child("else"),
                    location,
                )?);
            }
            let declared_at = position(object, &["if", "then", "else"]);
            groups.push((declared_at, Schema::Conditional(builder.build())));
        }

        groups.sort_by_key(|(declared_at, _)| *declared_at);
        Ok(groups.into_iter().map(|(_, schema)| schema).collect())
    }

    /// Join several group nodes under one loader-created `allOf`
    pub(crate) fn synthetic_all_of(
        &mut self,
        ids: Vec<SchemaId>,
        location: &SchemaLocation,
    ) -> LoadResult<CombinedSchema> {
        CombinedSchema::builder(Criterion::AllOf)
            .subschemas(ids)
            .synthetic(true)
            .build()
            .map_err(|e| LoadError::from_build(location, e))
    }

    fn load_typed_groups(
        &mut self,
        object: &Object,
        frame: &Frame,
        location: &SchemaLocation,
    ) -> LoadResult<Vec<(usize, Schema)>> {
        let declaration = match object.get("type") {
            Some(value) => Some(self.load_type_declaration(value, location)?),
            None => None,
        };

        match declaration {
            Some(TypeDeclaration::Many(types)) => {
                // Keywords of kinds the array does not list can never apply
                let mut branches = Vec::with_capacity(types.len());
                for name in types {
                    let branch =
                        self.load_primitive(name.group(), Some(name), object, frame, location)?;
                    branches.push(self.add_node(branch, location));
                }
                let schema = CombinedSchema::builder(Criterion::AnyOf)
                    .subschemas(branches)
                    .synthetic(true)
                    .build()
                    .map_err(|e| LoadError::from_build(location, e))?;
                Ok(vec![(position(object, &["type"]), Schema::Combined(schema))])
            }
            Some(TypeDeclaration::Single(name)) => {
                let mut groups = Vec::new();
                let mut names = Vec::new();
                for group in ["array", "object", "string", "number", "boolean", "null"] {
                    let declared = name.group() == group;
                    if declared || self.group_present(group, object) {
                        names.push(group.to_string());
                        let mut declared_at = position(object, group_keywords(group));
                        if declared {
                            declared_at = declared_at.min(position(object, &["type"]));
                        }
                        let schema = self.load_primitive(
                            group,
                            declared.then_some(name),
                            object,
                            frame,
                            location,
                        )?;
                        groups.push((declared_at, schema));
                    }
                }
                self.check_type_groups(names, location)?;
                Ok(groups)
            }
            None => {
                let mut groups = Vec::new();
                let mut names = Vec::new();
                for group in ["array", "object", "string", "number"] {
                    if self.group_present(group, object) {
                        names.push(group.to_string());
                        let schema = self.load_primitive(group, None, object, frame, location)?;
                        groups.push((position(object, group_keywords(group)), schema));
                    }
                }
                self.check_type_groups(names, location)?;
                Ok(groups)
            }
        }
    }

    fn load_type_declaration(
        &self,
        value: &Value,
        location: &SchemaLocation,
    ) -> LoadResult<TypeDeclaration> {
        let parse = |name: &str| {
            TypeName::parse(name).ok_or_else(|| {
                LoadError::invalid_schema(location, format!("unknown type '{}'", name))
            })
        };
        KindDispatch::new("type", value, location)
            .on(ValueKind::String, |v| {
                parse(v.as_str().unwrap_or_default()).map(TypeDeclaration::Single)
            })
            .on(ValueKind::Array, |v| {
                let mut names = Vec::new();
                for item in v.as_array().into_iter().flatten() {
                    let item = require("type", item, location, ValueKind::String)?;
                    names.push(parse(item.as_str().unwrap_or_default())?);
                }
                if names.is_empty() {
                    return Err(LoadError::invalid_schema(location, "'type' must not be empty"));
                }
                Ok(TypeDeclaration::Many(names))
            })
            .finish()
    }

    fn group_present(&self, group: &str, object: &Object) -> bool {
        has_any(object, group_keywords(group))
    }

    fn check_type_groups(&self, names: Vec<String>, location: &SchemaLocation) -> LoadResult<()> {
        if names.len() > 1 && self.config().multi_type_policy == MultiTypePolicy::Reject {
            return Err(LoadError::conflicting_type_groups(location, names));
        }
        Ok(())
    }

    /// Build the group for one primitive kind; `declared` is set when `type`
    /// demands that kind
    fn load_primitive(
        &mut self,
        group: &str,
        declared: Option<TypeName>,
        object: &Object,
        frame: &Frame,
        location: &SchemaLocation,
    ) -> LoadResult<Schema> {
        let requires = declared.is_some();
        match group {
            "array" => self.load_array(object, frame, location, requires).map(Schema::Array),
            "object" => self.load_object(object, frame, location, requires).map(Schema::Object),
            "string" => self.load_string(object, location, requires).map(Schema::String),
            "number" => {
                let integer = declared == Some(TypeName::Integer);
                self.load_number(object, location, requires, integer).map(Schema::Number)
            }
            "boolean" => Ok(Schema::Boolean),
            _ => Ok(Schema::Null),
        }
    }

    fn load_array(
        &mut self,
        object: &Object,
        frame: &Frame,
        location: &SchemaLocation,
        requires: bool,
    ) -> LoadResult<ArraySchema> {
        let mut builder = ArraySchema::builder().requires_array(requires);
        if let Some(value) = object.get("minItems") {
            builder = builder.min_items(count("minItems", value, location)?);
        }
        if let Some(value) = object.get("maxItems") {
            builder = builder.max_items(count("maxItems", value, location)?);
        }
        if let Some(value) = object.get("uniqueItems") {
            builder = builder.unique_items(boolean("uniqueItems", value, location)?);
        }
        if let Some(value) = object.get("items") {
            let items = KindDispatch::new("items", value, location)
                .on_any(SCHEMA_KINDS, |v| {
                    Ok(Items::All(self.load_subschema(v, frame.child("items"))?))
                })
                .on(ValueKind::Array, |v| {
                    Ok(Items::Tuple(self.load_schema_array("items", v, frame, location)?))
                })
                .finish()?;
            builder = match items {
                Items::All(id) => builder.all_items_schema(id),
                Items::Tuple(ids) => ids.into_iter().fold(builder, |b, id| b.add_item_schema(id)),
            };
        }
        if let Some(value) = object.get("additionalItems") {
            builder = match self.load_additional("additionalItems", value, frame, location)? {
                Additional::Allow => builder.additional_items(true),
                Additional::Deny => builder.additional_items(false),
                Additional::Schema(id) => builder.schema_of_additional_items(id),
            };
        }
        if let Some(value) = object.get("contains") {
            builder = builder.contains(self.load_keyword_schema(
                "contains",
                value,
                frame.child("contains"),
                location,
            )?);
        }
        builder.build().map_err(|e| LoadError::from_build(location, e))
    }

    fn load_object(
        &mut self,
        object: &Object,
        frame: &Frame,
        location: &SchemaLocation,
        requires: bool,
    ) -> LoadResult<ObjectSchema> {
        let mut builder = ObjectSchema::builder().requires_object(requires);

        if let Some(value) = object.get("properties") {
            let properties = require("properties", value, location, ValueKind::Object)?;
            let base = frame.child("properties");
            for (name, schema) in properties.as_object().into_iter().flatten() {
                let id = self.load_keyword_schema("properties", schema, base.child(name), location)?;
                builder = builder.add_property(name.clone(), id);
            }
        }
        if let Some(value) = object.get("required") {
            for name in strings("required", value, location)? {
                builder = builder.add_required(name);
            }
        }
        if let Some(value) = object.get("additionalProperties") {
            builder = match self.load_additional("additionalProperties", value, frame, location)? {
                Additional::Allow => builder.additional_properties(true),
                Additional::Deny => builder.additional_properties(false),
                Additional::Schema(id) => builder.schema_of_additional_properties(id),
            };
        }
        if let Some(value) = object.get("patternProperties") {
            let patterns = require("patternProperties", value, location, ValueKind::Object)?;
            let base = frame.child("patternProperties");
            for (pattern, schema) in patterns.as_object().into_iter().flatten() {
                let regex = compile_pattern("patternProperties", pattern, location)?;
                let id = self.load_keyword_schema(
                    "patternProperties",
                    schema,
                    base.child(pattern),
                    location,
                )?;
                builder = builder.pattern_property(regex, id);
            }
        }
        if let Some(value) = object.get("minProperties") {
            builder = builder.min_properties(count("minProperties", value, location)?);
        }
        if let Some(value) = object.get("maxProperties") {
            builder = builder.max_properties(count("maxProperties", value, location)?);
        }
        if let Some(value) = object.get("propertyNames") {
            builder = builder.property_names(self.load_keyword_schema(
                "propertyNames",
                value,
                frame.child("propertyNames"),
                location,
            )?);
        }
        if let Some(value) = object.get("dependencies") {
            let dependencies = require("dependencies", value, location, ValueKind::Object)?;
            let base = frame.child("dependencies");
            for (name, dependency) in dependencies.as_object().into_iter().flatten() {
                let dependency = KindDispatch::new("dependencies", dependency, location)
                    .on(ValueKind::Array, |v| {
                        strings("dependencies", v, location).map(Dependency::Properties)
                    })
                    .on_any(SCHEMA_KINDS, |v| {
                        self.load_subschema(v, base.child(name)).map(Dependency::Schema)
                    })
                    .finish()?;
                builder = match dependency {
                    Dependency::Properties(names) => builder.property_dependency(name.clone(), names),
                    Dependency::Schema(id) => builder.schema_dependency(name.clone(), id),
                };
            }
        }

        builder.build().map_err(|e| LoadError::from_build(location, e))
    }

    fn load_string(
        &self,
        object: &Object,
        location: &SchemaLocation,
        requires: bool,
    ) -> LoadResult<StringSchema> {
        let mut builder = StringSchema::builder().requires_string(requires);
        if let Some(value) = object.get("minLength") {
            builder = builder.min_length(count("minLength", value, location)?);
        }
        if let Some(value) = object.get("maxLength") {
            builder = builder.max_length(count("maxLength", value, location)?);
        }
        if let Some(value) = object.get("pattern") {
            let pattern = require("pattern", value, location, ValueKind::String)?;
            builder = builder.pattern(compile_pattern(
                "pattern",
                pattern.as_str().unwrap_or_default(),
                location,
            )?);
        }
        if let Some(value) = object.get("format") {
            let name = require("format", value, location, ValueKind::String)?
                .as_str()
                .unwrap_or_default();
            if self.config().validate_formats {
                match self.loader.formats().get(name) {
                    Some(validator) => builder = builder.format(FormatCheck::new(name, validator)),
                    None => tracing::warn!(format = name, %location, "unknown format is not enforced"),
                }
            }
        }
        builder.build().map_err(|e| LoadError::from_build(location, e))
    }

    fn load_number(
        &self,
        object: &Object,
        location: &SchemaLocation,
        requires: bool,
        integer: bool,
    ) -> LoadResult<NumberSchema> {
        let mut builder = NumberSchema::builder()
            .requires_number(requires)
            .requires_integer(integer);

        let minimum = optional_number("minimum", object, location)?;
        match (minimum, exclusive_bound("exclusiveMinimum", object, location)?) {
            (Some(min), Some(ExclusiveBound::Flag(true))) => builder = builder.exclusive_minimum(min),
            (minimum, bound) => {
                if let Some(min) = minimum {
                    builder = builder.minimum(min);
                }
                if let Some(ExclusiveBound::Limit(limit)) = bound {
                    builder = builder.exclusive_minimum(limit);
                }
            }
        }

        let maximum = optional_number("maximum", object, location)?;
        match (maximum, exclusive_bound("exclusiveMaximum", object, location)?) {
            (Some(max), Some(ExclusiveBound::Flag(true))) => builder = builder.exclusive_maximum(max),
            (maximum, bound) => {
                if let Some(max) = maximum {
                    builder = builder.maximum(max);
                }
                if let Some(ExclusiveBound::Limit(limit)) = bound {
                    builder = builder.exclusive_maximum(limit);
                }
            }
        }

        if let Some(divisor) = optional_number("multipleOf", object, location)? {
            builder = builder.multiple_of(divisor);
        }
        builder.build().map_err(|e| LoadError::from_build(location, e))
    }

    fn load_additional(
        &mut self,
        keyword: &str,
        value: &Value,
        frame: &Frame,
        location: &SchemaLocation,
    ) -> LoadResult<Additional> {
        KindDispatch::new(keyword, value, location)
            .on(ValueKind::Boolean, |v| {
                Ok(if v.as_bool().unwrap_or(true) {
                    Additional::Allow
                } else {
                    Additional::Deny
                })
            })
            .on(ValueKind::Object, |v| {
                Ok(Additional::Schema(self.load_subschema(v, frame.child(keyword))?))
            })
            .finish()
    }

    /// Load a keyword value that must itself be a schema
    fn load_keyword_schema(
        &mut self,
        keyword: &str,
        value: &Value,
        frame: Frame,
        location: &SchemaLocation,
    ) -> LoadResult<SchemaId> {
        KindDispatch::new(keyword, value, location)
            .on_any(SCHEMA_KINDS, |v| self.load_subschema(v, frame))
            .finish()
    }

    /// Load a keyword value that must be an array of schemas
    fn load_schema_array(
        &mut self,
        keyword: &str,
        value: &Value,
        frame: &Frame,
        location: &SchemaLocation,
    ) -> LoadResult<Vec<SchemaId>> {
        let items = require(keyword, value, location, ValueKind::Array)?;
        let base = frame.child(keyword);
        let mut ids = Vec::new();
        for (index, item) in items.as_array().into_iter().flatten().enumerate() {
            ids.push(self.load_keyword_schema(keyword, item, base.child(index), location)?);
        }
        Ok(ids)
    }
}

/// Draft-4 boolean form or draft-6 numeric form of `exclusiveMinimum`/`exclusiveMaximum`
enum ExclusiveBound {
    Limit(f64),
    Flag(bool),
}

fn exclusive_bound(
    keyword: &str,
    object: &Object,
    location: &SchemaLocation,
) -> LoadResult<Option<ExclusiveBound>> {
    let Some(value) = object.get(keyword) else {
        return Ok(None);
    };
    KindDispatch::new(keyword, value, location)
        .on(ValueKind::Number, |v| Ok(ExclusiveBound::Limit(v.as_f64().unwrap_or_default())))
        .on(ValueKind::Boolean, |v| Ok(ExclusiveBound::Flag(v.as_bool().unwrap_or_default())))
        .finish()
        .map(Some)
}

fn optional_number(keyword: &str, object: &Object, location: &SchemaLocation) -> LoadResult<Option<f64>> {
    match object.get(keyword) {
        Some(value) => {
            let number = require(keyword, value, location, ValueKind::Number)?;
            Ok(number.as_f64())
        }
        None => Ok(None),
    }
}

/// Non-negative integer keyword value
fn count(keyword: &str, value: &Value, location: &SchemaLocation) -> LoadResult<u64> {
    let number = require(keyword, value, location, ValueKind::Number)?;
    let valid = match number {
        Value::Number(n) if is_integral(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        _ => None,
    };
    valid.ok_or_else(|| {
        LoadError::invalid_schema(
            location,
            format!("'{}' must be a non-negative integer, found {}", keyword, value),
        )
    })
}

fn boolean(keyword: &str, value: &Value, location: &SchemaLocation) -> LoadResult<bool> {
    Ok(require(keyword, value, location, ValueKind::Boolean)?
        .as_bool()
        .unwrap_or_default())
}

fn strings(keyword: &str, value: &Value, location: &SchemaLocation) -> LoadResult<Vec<String>> {
    let items = require(keyword, value, location, ValueKind::Array)?;
    items
        .as_array()
        .into_iter()
        .flatten()
        .map(|item| {
            require(keyword, item, location, ValueKind::String)
                .map(|v| v.as_str().unwrap_or_default().to_string())
        })
        .collect()
}

fn compile_pattern(keyword: &str, pattern: &str, location: &SchemaLocation) -> LoadResult<Regex> {
    Regex::new(pattern).map_err(|e| {
        LoadError::invalid_schema(location, format!("invalid {} '{}': {}", keyword, pattern, e))
    })
}
