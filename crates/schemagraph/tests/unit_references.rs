//! `$ref` resolution, external documents and shared schemas
//!
//! Copyright (c) 2025 Schemagraph Authors
//! Licensed under the Apache-2.0 license

use serde_json::{json, Value};
use schemagraph::loader::{CacheConfig, CachingFetcher, FetchError, InMemoryFetcher};
use schemagraph::{
    CompiledSchema, FileFetcher, LoadError, ReferenceResolutionError, Schema, SchemaId,
    SchemaLoader, Validator, DEFAULT_BASE_URI,
};
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

fn compile(document: Value) -> CompiledSchema {
    SchemaLoader::new().load(&document, DEFAULT_BASE_URI).unwrap()
}

/// Handle of the node declared at `location`
fn located(schema: &CompiledSchema, location: &str) -> SchemaId {
    schema
        .graph()
        .iter()
        .find(|(_, node)| node.metadata.location.to_string() == location)
        .map(|(id, _)| id)
        .unwrap_or_else(|| panic!("no node at {}", location))
}

#[cfg(test)]
mod cycles {
    use super::*;

    fn mutual() -> CompiledSchema {
        compile(json!({
            "definitions": {
                "A": {"type": "object", "properties": {"b": {"$ref": "#/definitions/B"}}},
                "B": {"type": "object", "properties": {"a": {"$ref": "#/definitions/A"}}}
            },
            "$ref": "#/definitions/A"
        }))
    }

    #[test]
    fn test_mutual_references_form_a_cycle() {
        let schema = mutual();
        assert!(matches!(schema.root_node().schema, Schema::Reference(_)));

        let a = located(&schema, "mem://root#/definitions/A");
        let b = located(&schema, "mem://root#/definitions/B");
        let a_property = located(&schema, "mem://root#/definitions/A/properties/b");
        let b_property = located(&schema, "mem://root#/definitions/B/properties/a");
        assert!(matches!(&schema.node(a_property).schema, Schema::Reference(r) if r.target() == b));
        assert!(matches!(&schema.node(b_property).schema, Schema::Reference(r) if r.target() == a));
        assert!(matches!(&schema.root_node().schema, Schema::Reference(r) if r.target() == a));
    }

    #[test]
    fn test_mutual_references_validate() {
        let schema = mutual();
        assert!(schema.is_valid(&json!({"b": {"a": {"b": {}}}})));

        let found = Validator::default().violations(&schema, &json!({"b": {"a": 5}}));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].keyword, "type");
        assert_eq!(found[0].path.to_string(), "#/b/a");
        assert_eq!(found[0].schema_location, "mem://root#/definitions/A");
    }

    #[test]
    fn test_recursive_tree() {
        let schema = compile(json!({
            "type": "object",
            "required": ["value"],
            "properties": {
                "value": {"type": "integer"},
                "children": {"type": "array", "items": {"$ref": "#"}}
            }
        }));
        let tree = json!({
            "value": 1,
            "children": [
                {"value": 2, "children": []},
                {"value": 3, "children": [{"value": 4}]}
            ]
        });
        assert!(schema.is_valid(&tree));

        let broken = json!({"value": 1, "children": [{"value": 2}, {"children": [{"value": "x"}]}]});
        let found = Validator::default().violations(&schema, &broken);
        let paths: Vec<String> = found.iter().map(|v| v.path.to_string()).collect();
        assert_eq!(paths, vec!["#/children/1", "#/children/1/children/0/value"]);
    }

    #[test]
    fn test_self_reference_without_progress_terminates() {
        let schema = compile(json!({"allOf": [{"$ref": "#"}], "minimum": 3}));
        assert!(schema.is_valid(&json!(4)));
        assert!(!schema.is_valid(&json!(2)));
    }
}

#[cfg(test)]
mod scoping {
    use super::*;

    #[test]
    fn test_id_changes_resolution_scope() {
        let loader = SchemaLoader::new().with_fetcher(
            InMemoryFetcher::new()
                .with_document("http://example.com/nested/item.json", json!({"type": "string"})),
        );
        let schema = loader
            .load(
                &json!({
                    "$id": "http://example.com/root.json",
                    "properties": {
                        "local": {"$ref": "#/definitions/count"},
                        "nested": {
                            "$id": "nested/",
                            "items": {"$ref": "item.json"}
                        }
                    },
                    "definitions": {"count": {"type": "integer"}}
                }),
                "http://example.com/root.json",
            )
            .unwrap();

        assert!(schema.is_valid(&json!({"local": 1, "nested": ["a", "b"]})));
        assert!(!schema.is_valid(&json!({"local": "1"})));
        assert!(!schema.is_valid(&json!({"nested": [1]})));
    }

    #[test]
    fn test_plain_name_fragment() {
        let schema = compile(json!({
            "properties": {"p": {"$ref": "#positive"}},
            "definitions": {"positive": {"$id": "#positive", "exclusiveMinimum": 0}}
        }));
        assert!(schema.is_valid(&json!({"p": 1})));
        assert!(!schema.is_valid(&json!({"p": 0})));
    }

    #[test]
    fn test_escaped_pointer_fragment() {
        let schema = compile(json!({
            "definitions": {"a/b": {"type": "null"}, "c%d": {"type": "boolean"}},
            "properties": {
                "x": {"$ref": "#/definitions/a~1b"},
                "y": {"$ref": "#/definitions/c%25d"}
            }
        }));
        assert!(schema.is_valid(&json!({"x": null, "y": true})));
        assert!(!schema.is_valid(&json!({"x": 1})));
        assert!(!schema.is_valid(&json!({"y": 1})));
    }
}

#[cfg(test)]
mod external {
    use super::*;

    fn definitions() -> Value {
        json!({
            "definitions": {
                "name": {"type": "string", "minLength": 1},
                "names": {"type": "array", "items": {"$ref": "#/definitions/name"}}
            }
        })
    }

    #[test]
    fn test_in_memory_documents() {
        let loader = SchemaLoader::new().with_fetcher(
            InMemoryFetcher::new().with_document("mem://schemas/defs.json", definitions()),
        );
        let schema = loader
            .load(
                &json!({"properties": {"tags": {"$ref": "defs.json#/definitions/names"}}}),
                "mem://schemas/root.json",
            )
            .unwrap();

        assert!(schema.is_valid(&json!({"tags": ["a", "b"]})));
        let found = Validator::default().violations(&schema, &json!({"tags": ["a", ""]}));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].path.to_string(), "#/tags/1");
        assert_eq!(found[0].schema_location, "mem://schemas/defs.json#/definitions/name");
    }

    #[test]
    fn test_file_documents() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("common.yaml"),
            "definitions:\n  id:\n    type: integer\n    minimum: 1\n",
        )
        .unwrap();
        let schema_path = dir.path().join("schema.json");
        fs::write(
            &schema_path,
            r#"{"type": "object", "properties": {"id": {"$ref": "common.yaml#/definitions/id"}}}"#,
        )
        .unwrap();

        let loader = SchemaLoader::new().with_fetcher(FileFetcher::confined_to(dir.path()));
        let schema = loader.load_file(&schema_path).unwrap();
        assert!(schema.is_valid(&json!({"id": 3})));
        assert!(!schema.is_valid(&json!({"id": 0})));
    }

    #[test]
    fn test_file_fetcher_refuses_paths_outside_root() {
        let outer = TempDir::new().unwrap();
        let root = outer.path().join("root");
        fs::create_dir(&root).unwrap();
        fs::write(outer.path().join("secret.json"), "{}").unwrap();
        let schema_path = root.join("schema.json");
        fs::write(&schema_path, r#"{"$ref": "../secret.json"}"#).unwrap();

        let loader = SchemaLoader::new().with_fetcher(FileFetcher::confined_to(&root));
        match loader.load_file(&schema_path).unwrap_err() {
            LoadError::Reference(ReferenceResolutionError::Fetch { source, .. }) => {
                assert!(matches!(source, FetchError::PathTraversal { .. }));
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_fetch_failure_surfaces_as_reference_error() {
        // The default loader does not fetch anything
        let error = SchemaLoader::new()
            .load(&json!({"$ref": "other.json#/x"}), "mem://root/schema.json")
            .unwrap_err();
        match error {
            LoadError::Reference(ReferenceResolutionError::Fetch { uri, source, .. }) => {
                assert_eq!(uri, "mem://root/other.json");
                assert!(matches!(source, FetchError::Disabled { .. }));
            }
            other => panic!("unexpected error: {}", other),
        }

        let missing = SchemaLoader::new()
            .with_fetcher(InMemoryFetcher::new())
            .load(&json!({"$ref": "other.json"}), "mem://root/schema.json")
            .unwrap_err();
        assert!(matches!(
            missing,
            LoadError::Reference(ReferenceResolutionError::Fetch {
                source: FetchError::NotFound { .. },
                ..
            })
        ));
    }

    #[test]
    fn test_cached_documents_are_fetched_once() {
        let fetcher = Arc::new(CachingFetcher::with_config(
            InMemoryFetcher::new().with_document("mem://schemas/defs.json", definitions()),
            CacheConfig::default(),
        ));
        let loader = SchemaLoader::new().with_fetcher(Arc::clone(&fetcher));
        let document = json!({
            "properties": {
                "a": {"$ref": "defs.json#/definitions/name"},
                "b": {"$ref": "defs.json#/definitions/names"}
            }
        });

        loader.load(&document, "mem://schemas/root.json").unwrap();
        loader.load(&document, "mem://schemas/root.json").unwrap();

        let stats = fetcher.stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.total_entries, 1);
    }
}

#[cfg(test)]
mod sharing {
    use super::*;
    use std::thread;

    #[test]
    fn test_concurrent_validation() {
        let schema = compile(json!({
            "type": "array",
            "items": {"type": "integer", "minimum": 0}
        }));

        thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|n| {
                    let schema = schema.clone();
                    scope.spawn(move || {
                        let validator = Validator::default();
                        let good = json!([n, n + 1, n + 2]);
                        let bad = json!([n, -1 - n]);
                        (
                            validator.validate(&schema, &good).is_ok(),
                            validator.violations(&schema, &bad).len(),
                        )
                    })
                })
                .collect();
            for handle in handles {
                assert_eq!(handle.join().unwrap(), (true, 1));
            }
        });
    }

    #[test]
    fn test_compiled_schema_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CompiledSchema>();
        assert_send_sync::<SchemaLoader>();
    }
}
