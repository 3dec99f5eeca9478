//! The compiled schema graph
//!
//! A schema is a closed family of variants ([`Schema`]) stored as
//! [`SchemaNode`]s in an arena and addressed by [`SchemaId`]. Composition is
//! tree-shaped except for [`ReferenceSchema`] edges, which may form cycles.
//! Graphs are assembled through [`GraphBuilder`] and frozen into a
//! [`CompiledSchema`] that is cheap to clone and safe to share across threads.
//!
//! Copyright (c) 2025 Schemagraph Authors
//! Licensed under the Apache-2.0 license

pub mod builders;
pub mod graph;
pub mod variants;

pub use builders::{
    ArraySchemaBuilder, BuildError, CombinedSchemaBuilder, ConditionalSchemaBuilder,
    EnumSchemaBuilder, NumberSchemaBuilder, ObjectSchemaBuilder, StringSchemaBuilder,
};
pub use graph::{CompiledSchema, GraphBuilder, GraphError, SchemaGraph};
pub use variants::{
    Additional, ArraySchema, CombinedSchema, ConditionalSchema, ConstSchema, Criterion,
    Dependency, EnumSchema, FormatCheck, Items, NotSchema, NumberSchema, ObjectSchema,
    PatternProperty, ReferenceSchema, StringSchema,
};

use crate::value::JsonPointer;
use serde_json::Value;
use std::fmt;

/// Handle of a node inside a schema arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SchemaId(usize);

impl SchemaId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    /// Position of the node in its arena
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for SchemaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One case per schema variant
#[derive(Debug, Clone)]
pub enum Schema {
    /// Accepts every instance (`{}` or `true`)
    Empty,
    /// Rejects every instance (`false`)
    False,
    Enum(EnumSchema),
    Const(ConstSchema),
    Array(ArraySchema),
    Object(ObjectSchema),
    String(StringSchema),
    Number(NumberSchema),
    Boolean,
    Null,
    Not(NotSchema),
    Combined(CombinedSchema),
    Conditional(ConditionalSchema),
    Reference(ReferenceSchema),
}

impl Schema {
    /// Short variant name for logs and debugging output
    pub fn variant_name(&self) -> &'static str {
        match self {
            Schema::Empty => "empty",
            Schema::False => "false",
            Schema::Enum(_) => "enum",
            Schema::Const(_) => "const",
            Schema::Array(_) => "array",
            Schema::Object(_) => "object",
            Schema::String(_) => "string",
            Schema::Number(_) => "number",
            Schema::Boolean => "boolean",
            Schema::Null => "null",
            Schema::Not(_) => "not",
            Schema::Combined(_) => "combined",
            Schema::Conditional(_) => "conditional",
            Schema::Reference(_) => "reference",
        }
    }

    /// Every node handle this node points at, in declaration order
    pub fn children(&self) -> Vec<SchemaId> {
        match self {
            Schema::Empty
            | Schema::False
            | Schema::Enum(_)
            | Schema::Const(_)
            | Schema::String(_)
            | Schema::Number(_)
            | Schema::Boolean
            | Schema::Null => Vec::new(),
            Schema::Array(array) => array.children(),
            Schema::Object(object) => object.children(),
            Schema::Not(not) => vec![not.negated()],
            Schema::Combined(combined) => combined.subschemas().to_vec(),
            Schema::Conditional(conditional) => {
                let mut ids = vec![conditional.if_schema()];
                ids.extend(conditional.then_schema());
                ids.extend(conditional.else_schema());
                ids
            }
            Schema::Reference(reference) => vec![reference.target()],
        }
    }
}

/// Where a node was declared: document URI plus JSON pointer
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SchemaLocation {
    pub document: String,
    pub pointer: JsonPointer,
}

impl SchemaLocation {
    pub fn new<D: Into<String>>(document: D, pointer: JsonPointer) -> Self {
        Self {
            document: document.into(),
            pointer,
        }
    }

    /// Location of a child reached through `token`
    pub fn child<T: ToString>(&self, token: T) -> Self {
        Self {
            document: self.document.clone(),
            pointer: self.pointer.child(token),
        }
    }
}

impl fmt::Display for SchemaLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.document, self.pointer)
    }
}

/// Annotations shared by all variants
#[derive(Debug, Clone, Default)]
pub struct SchemaMetadata {
    pub location: SchemaLocation,
    pub id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub default: Option<Value>,
}

impl SchemaMetadata {
    pub fn at(location: SchemaLocation) -> Self {
        Self {
            location,
            ..Default::default()
        }
    }
}

/// A schema variant together with its metadata
#[derive(Debug, Clone)]
pub struct SchemaNode {
    pub metadata: SchemaMetadata,
    pub schema: Schema,
}

impl SchemaNode {
    pub fn new(schema: Schema, metadata: SchemaMetadata) -> Self {
        Self { metadata, schema }
    }

    /// Node with metadata defaulted apart from its location
    pub fn at(schema: Schema, location: SchemaLocation) -> Self {
        Self::new(schema, SchemaMetadata::at(location))
    }
}

impl From<Schema> for SchemaNode {
    fn from(schema: Schema) -> Self {
        Self::new(schema, SchemaMetadata::default())
    }
}
