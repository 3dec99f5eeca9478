//! Schema loading demonstration example
//!
//! Shows `$ref` resolution across in-memory documents, recursive schemas and
//! the loader's multi-type policy.
//!
//! Copyright (c) 2025 Schemagraph Authors
//! Licensed under the Apache-2.0 license

use serde_json::json;
use schemagraph::loader::{CachingFetcher, InMemoryFetcher};
use schemagraph::{LoaderConfig, MultiTypePolicy, SchemaLoader, DEFAULT_BASE_URI};
use std::sync::Arc;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Schemagraph Loader Demo ===\n");

    demo_external_documents()?;
    println!();
    demo_recursive_schema()?;
    println!();
    demo_multi_type_policy();

    Ok(())
}

fn demo_external_documents() -> Result<(), Box<dyn std::error::Error>> {
    println!("--- External documents ---");

    let fetcher = Arc::new(CachingFetcher::new(InMemoryFetcher::new().with_document(
        "mem://schemas/common.json",
        json!({"definitions": {"id": {"type": "integer", "minimum": 1}}}),
    )));
    let loader = SchemaLoader::new().with_fetcher(Arc::clone(&fetcher));

    let document = json!({
        "properties": {
            "id": {"$ref": "common.json#/definitions/id"},
            "parent": {"$ref": "common.json#/definitions/id"}
        }
    });
    let schema = loader.load(&document, "mem://schemas/order.json")?;
    loader.load(&document, "mem://schemas/order.json")?;

    println!("   {{\"id\": 7}} valid: {}", schema.is_valid(&json!({"id": 7})));
    for violation in schema.violations(&json!({"id": 0})) {
        println!("   {} ({})", violation, violation.schema_location);
    }
    let stats = fetcher.stats();
    println!("   cache: {} hit(s), {} miss(es)", stats.hits, stats.misses);
    Ok(())
}

fn demo_recursive_schema() -> Result<(), Box<dyn std::error::Error>> {
    println!("--- Recursive schema ---");

    let schema = SchemaLoader::new().load(
        &json!({
            "type": "object",
            "properties": {
                "label": {"type": "string"},
                "children": {"type": "array", "items": {"$ref": "#"}}
            }
        }),
        DEFAULT_BASE_URI,
    )?;
    let tree = json!({"label": "root", "children": [{"label": "leaf", "children": [{"label": 5}]}]});
    for violation in schema.violations(&tree) {
        println!("   {}", violation);
    }
    Ok(())
}

fn demo_multi_type_policy() {
    println!("--- Multi-type policy ---");

    let document = json!({"minLength": 2, "minimum": 10});
    let strict = SchemaLoader::with_config(
        LoaderConfig::default().with_multi_type_policy(MultiTypePolicy::Reject),
    );
    match strict.load(&document, DEFAULT_BASE_URI) {
        Ok(_) => println!("   Unexpectedly accepted"),
        Err(e) => println!("   Rejected: {}", e),
    }
    if let Ok(schema) = SchemaLoader::new().load(&document, DEFAULT_BASE_URI) {
        println!("   \"a\" valid: {}", schema.is_valid(&json!("a")));
        println!("   42 valid: {}", schema.is_valid(&json!(42)));
    }
}
