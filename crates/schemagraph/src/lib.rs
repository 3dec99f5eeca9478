//! Schemagraph - JSON Schema compiler and validator
//!
//! This crate compiles JSON Schema documents (draft-4 through draft-7
//! keyword vocabulary) into an immutable, typed schema graph and validates
//! JSON instances against it:
//! - **Loading**: documents become a closed family of schema variants, with
//!   keyword values type-checked as they are read
//! - **References**: `$ref` is resolved against `$id` scopes, JSON pointers
//!   and plain-name fragments; recursive schemas compile to cyclic graphs
//! - **Validation**: every violation is reported with its instance path,
//!   keyword and schema location, or validation stops at the first one
//!
//! ## Quick Start
//!
//! ```rust
//! use schemagraph::{SchemaLoader, Validator, DEFAULT_BASE_URI};
//! use serde_json::json;
//!
//! let schema = SchemaLoader::new().load(
//!     &json!({
//!         "type": "object",
//!         "properties": {"name": {"type": "string", "minLength": 1}},
//!         "required": ["name"]
//!     }),
//!     DEFAULT_BASE_URI,
//! )?;
//!
//! let validator = Validator::default();
//! assert!(validator.validate(&schema, &json!({"name": "graph"})).is_ok());
//!
//! let failure = validator.validate(&schema, &json!({})).unwrap_err();
//! assert_eq!(failure.violations()[0].keyword, "required");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Aggregation Modes
//!
//! - **CollectAll**: every violation, in schema order (the default)
//! - **FailFast**: the first violation only
//!
//! Copyright (c) 2025 Schemagraph Authors
//! Licensed under the Apache-2.0 license

pub mod loader;
pub mod schema;
pub mod validation;
pub mod value;

// Re-export commonly used types for convenience
pub use loader::{
    FetchError, FileFetcher, InMemoryFetcher, LoadError, LoadResult, LoaderConfig,
    MultiTypePolicy, ReferenceFetcher, ReferenceResolutionError, SchemaLoader,
    TypeMismatchError, DEFAULT_BASE_URI,
};
pub use schema::{CompiledSchema, Schema, SchemaId, SchemaLocation, SchemaNode};
pub use validation::{
    AggregationMode, ValidationConfig, ValidationFailure, ValidationResult, Validator, Violation,
};
pub use value::{JsonPointer, ValueKind};
