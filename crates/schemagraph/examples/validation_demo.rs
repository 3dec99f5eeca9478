//! Validation demonstration example
//!
//! Copyright (c) 2025 Schemagraph Authors
//! Licensed under the Apache-2.0 license

use serde_json::json;
use schemagraph::{SchemaLoader, ValidationConfig, Validator, DEFAULT_BASE_URI};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Schemagraph Validation Demo ===\n");

    let schema = SchemaLoader::new().load(
        &json!({
            "type": "object",
            "required": ["name", "tags"],
            "properties": {
                "name": {"type": "string", "minLength": 1},
                "tags": {"type": "array", "items": {"type": "string"}, "uniqueItems": true},
                "priority": {"oneOf": [{"type": "integer", "minimum": 1}, {"enum": ["low", "high"]}]}
            },
            "additionalProperties": false
        }),
        DEFAULT_BASE_URI,
    )?;
    println!("Compiled schema with {} nodes\n", schema.graph().len());

    println!("✅ Validating a valid document:");
    match schema.validate(&json!({"name": "demo", "tags": ["a", "b"], "priority": "low"})) {
        Ok(()) => println!("   Valid!"),
        Err(e) => println!("   Error: {}", e),
    }

    let invalid = json!({"name": "", "tags": ["a", "a", 3], "priority": 0, "extra": true});

    println!("\n❌ Collecting every violation:");
    if let Err(failure) = schema.validate(&invalid) {
        println!("{}", failure);
    }

    println!("\n🔍 Fail-fast mode:");
    for violation in Validator::fail_fast().violations(&schema, &invalid) {
        println!("   {} [{}] {}", violation.path, violation.keyword, violation.message);
    }

    println!("\n🔍 Capped at two violations:");
    let capped = Validator::new(ValidationConfig::default().with_max_errors(2));
    for violation in capped.violations(&schema, &invalid) {
        println!("   {} [{}] {}", violation.path, violation.keyword, violation.message);
    }

    Ok(())
}
