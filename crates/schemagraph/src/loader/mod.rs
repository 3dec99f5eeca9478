//! Schema loading: from parsed JSON documents to compiled schema graphs
//!
//! This module turns schema documents into a [`CompiledSchema`]:
//! - YAML and JSON parsing
//! - `$ref` resolution with `$id` scoping, JSON pointers and plain-name fragments
//! - Pluggable fetching of external documents, with an optional caching layer
//! - Type narrowing of keyword values with precise mismatch errors
//! - Cycle-safe construction through a canonical-URI registry
//!
//! # Example Usage
//!
//! ```rust
//! use schemagraph::loader::{SchemaLoader, DEFAULT_BASE_URI};
//! use serde_json::json;
//!
//! let loader = SchemaLoader::new();
//! let schema = loader.load(&json!({"type": "string", "minLength": 2}), DEFAULT_BASE_URI)?;
//! assert!(schema.is_valid(&json!("ok")));
//! assert!(!schema.is_valid(&json!("x")));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! [`CompiledSchema`]: crate::schema::CompiledSchema
//!
//! Copyright (c) 2025 Schemagraph Authors
//! Licensed under the Apache-2.0 license

pub mod cache;
pub mod error;
pub mod fetcher;
pub mod formats;
mod keywords;
pub mod narrowing;
pub mod parser;
pub mod registry;
pub mod resolver;
pub mod schema_loader;

pub use cache::{CacheConfig, CacheStats, CachingFetcher};
pub use error::{
    FetchError, LoadError, LoadResult, ParseError, ReferenceResolutionError, TypeMismatchError,
};
pub use fetcher::{FileFetcher, InMemoryFetcher, ReferenceFetcher, RejectingFetcher};
pub use formats::{FormatRegistry, FormatValidator};
pub use parser::{DocumentParser, Format};
pub use schema_loader::{LoaderConfig, MultiTypePolicy, SchemaLoader, DEFAULT_BASE_URI};
