//! Validation behavior of compiled schemas
//!
//! These tests load schema documents through the public loader and check
//! which instances pass, which violations are reported, and where.
//!
//! Copyright (c) 2025 Schemagraph Authors
//! Licensed under the Apache-2.0 license

use serde_json::{json, Value};
use schemagraph::validation::FailureReason;
use schemagraph::{
    AggregationMode, CompiledSchema, SchemaLoader, ValidationConfig, Validator, Violation,
    DEFAULT_BASE_URI,
};

fn compile(document: Value) -> CompiledSchema {
    SchemaLoader::new().load(&document, DEFAULT_BASE_URI).unwrap()
}

fn violations(schema: &CompiledSchema, instance: Value) -> Vec<Violation> {
    Validator::default().violations(schema, &instance)
}

fn keywords(violations: &[Violation]) -> Vec<&str> {
    violations.iter().map(|v| v.keyword.as_str()).collect()
}

#[cfg(test)]
mod enum_and_const {
    use super::*;

    #[test]
    fn test_enum_uses_deep_equality() {
        let schema = compile(json!({"enum": [1, "a", {"b": [1, 2]}]}));

        assert!(schema.is_valid(&json!(1)));
        assert!(schema.is_valid(&json!(1.0)));
        assert!(schema.is_valid(&json!("a")));
        assert!(schema.is_valid(&json!({"b": [1.0, 2]})));

        let found = violations(&schema, json!(2));
        assert_eq!(keywords(&found), vec!["enum"]);
        assert_eq!(found[0].message, "2 is not a valid enum value");
        assert_eq!(found[0].schema_location, "mem://root#");

        assert!(!schema.is_valid(&json!({"b": [2, 1]})));
        assert!(!schema.is_valid(&json!("A")));
    }

    #[test]
    fn test_const() {
        let schema = compile(json!({"const": {"x": [null, true]}}));
        assert!(schema.is_valid(&json!({"x": [null, true]})));
        assert!(!schema.is_valid(&json!({"x": [null, false]})));
        assert!(!schema.is_valid(&json!({"x": [null, true], "y": 1})));
    }
}

#[cfg(test)]
mod arrays {
    use super::*;

    fn tuple() -> CompiledSchema {
        compile(json!({
            "items": [{"type": "integer"}, {"type": "string"}],
            "additionalItems": false
        }))
    }

    #[test]
    fn test_tuple_with_additional_items_denied() {
        let schema = tuple();
        assert!(schema.is_valid(&json!([1, "a"])));
        assert!(schema.is_valid(&json!([1])));

        let found = violations(&schema, json!([1, "a", true]));
        assert_eq!(keywords(&found), vec!["additionalItems"]);
        assert_eq!(found[0].path.to_string(), "#");
        assert_eq!(found[0].message, "expected: 2 array items, found: 3");
    }

    #[test]
    fn test_tuple_positions_report_item_paths() {
        let found = violations(&tuple(), json!(["a", 1]));
        assert_eq!(keywords(&found), vec!["type", "type"]);
        assert_eq!(found[0].path.to_string(), "#/0");
        assert_eq!(found[1].path.to_string(), "#/1");
        assert_eq!(found[0].schema_location, "mem://root#/items/0");
        assert_eq!(found[1].message, "expected type: string, found: number");
    }

    #[test]
    fn test_additional_items_schema() {
        let schema = compile(json!({
            "items": [{"type": "string"}],
            "additionalItems": {"type": "integer"}
        }));
        assert!(schema.is_valid(&json!(["a", 1, 2])));
        let found = violations(&schema, json!(["a", 1, "b"]));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].path.to_string(), "#/2");
    }

    #[test]
    fn test_unique_items_beyond_i64_range() {
        let schema = compile(json!({"uniqueItems": true}));
        let integer = json!(9_223_372_036_854_775_808u64);
        let float = json!(9_223_372_036_854_775_808.0);

        let scalars = json!([integer.clone(), float.clone()]);
        let with_container = json!([integer, float, []]);
        assert_eq!(keywords(&violations(&schema, scalars)), vec!["uniqueItems"]);
        assert_eq!(keywords(&violations(&schema, with_container)), vec!["uniqueItems"]);

        // Exact values differ even though both round to 2^64 as floats
        assert!(schema.is_valid(&json!([u64::MAX, 18_446_744_073_709_551_616.0])));
    }

    #[test]
    fn test_unique_items_and_bounds() {
        let schema = compile(json!({"uniqueItems": true, "minItems": 2, "maxItems": 3}));
        assert!(schema.is_valid(&json!([1, 2])));
        assert!(!schema.is_valid(&json!([1, 1.0])));
        assert!(!schema.is_valid(&json!([{"a": 1}, {"a": 1}])));
        assert_eq!(keywords(&violations(&schema, json!([1]))), vec!["minItems"]);
        assert_eq!(keywords(&violations(&schema, json!([1, 2, 3, 4]))), vec!["maxItems"]);
        // Array keywords do not constrain other kinds without "type"
        assert!(schema.is_valid(&json!("not an array")));
    }

    #[test]
    fn test_contains() {
        let schema = compile(json!({"contains": {"const": 3}}));
        assert!(schema.is_valid(&json!([1, 3])));
        assert_eq!(keywords(&violations(&schema, json!([1, 2]))), vec!["contains"]);
    }
}

#[cfg(test)]
mod combinators {
    use super::*;

    fn one_of() -> CompiledSchema {
        compile(json!({"oneOf": [{"type": "integer"}, {"minimum": 2}]}))
    }

    #[test]
    fn test_one_of_exactly_one() {
        let schema = one_of();
        assert!(schema.is_valid(&json!(1)));
        assert!(schema.is_valid(&json!(2.5)));
    }

    #[test]
    fn test_one_of_ambiguous() {
        let found = violations(&one_of(), json!(3));
        assert_eq!(keywords(&found), vec!["oneOf"]);
        assert_eq!(
            found[0].reason,
            Some(FailureReason::Ambiguous { matching: vec![0, 1] })
        );
        assert!(found[0].causes.is_empty());
    }

    #[test]
    fn test_one_of_no_match() {
        let found = violations(&one_of(), json!(1.5));
        assert_eq!(keywords(&found), vec!["oneOf"]);
        assert_eq!(found[0].reason, Some(FailureReason::NoMatch));
        assert_eq!(keywords(&found[0].causes), vec!["type", "minimum"]);
    }

    #[test]
    fn test_any_of_and_all_of() {
        let any_of = compile(json!({"anyOf": [{"type": "string"}, {"type": "null"}]}));
        assert!(any_of.is_valid(&json!(null)));
        let found = violations(&any_of, json!(1));
        assert_eq!(keywords(&found), vec!["anyOf"]);
        assert_eq!(found[0].causes.len(), 2);

        let all_of = compile(json!({"allOf": [{"minimum": 1}, {"maximum": 3}]}));
        assert!(all_of.is_valid(&json!(2)));
        assert_eq!(keywords(&violations(&all_of, json!(5))), vec!["maximum"]);
    }

    #[test]
    fn test_not() {
        let schema = compile(json!({"not": {"type": "string"}}));
        assert!(schema.is_valid(&json!(1)));
        assert_eq!(keywords(&violations(&schema, json!("s"))), vec!["not"]);
    }

    #[test]
    fn test_conditional() {
        let schema = compile(json!({
            "if": {"properties": {"kind": {"const": "circle"}}},
            "then": {"required": ["radius"]},
            "else": {"required": ["width"]}
        }));
        assert!(schema.is_valid(&json!({"kind": "circle", "radius": 1})));
        assert!(schema.is_valid(&json!({"kind": "square", "width": 1})));

        let found = violations(&schema, json!({"kind": "circle"}));
        assert_eq!(keywords(&found), vec!["then"]);
        assert_eq!(keywords(&found[0].causes), vec!["required"]);

        let found = violations(&schema, json!({"kind": "square"}));
        assert_eq!(keywords(&found), vec!["else"]);
    }

    #[test]
    fn test_boolean_subschemas() {
        let schema = compile(json!({"properties": {"never": false, "always": true}}));
        assert!(schema.is_valid(&json!({"always": [1, 2]})));
        let found = violations(&schema, json!({"never": 1}));
        assert_eq!(keywords(&found), vec!["false"]);
        assert_eq!(found[0].path.to_string(), "#/never");
    }
}

#[cfg(test)]
mod aggregation {
    use super::*;

    fn schema() -> CompiledSchema {
        compile(json!({
            "type": "object",
            "required": ["name"],
            "properties": {
                "title": {"type": "string", "minLength": 5},
                "count": {"type": "integer", "minimum": 10}
            }
        }))
    }

    fn instance() -> Value {
        json!({"title": "abc", "count": 3})
    }

    #[test]
    fn test_collect_all_reports_every_violation() {
        let found = violations(&schema(), instance());
        assert_eq!(keywords(&found), vec!["required", "minLength", "minimum"]);
        assert_eq!(found[1].path.to_string(), "#/title");
        assert_eq!(found[2].path.to_string(), "#/count");

        let failure = Validator::default().validate(&schema(), &instance()).unwrap_err();
        assert_eq!(failure.len(), 3);
        assert!(failure.to_string().starts_with("#: 3 schema violations found"));
    }

    #[test]
    fn test_fail_fast_stops_at_first() {
        let validator = Validator::fail_fast();
        assert_eq!(validator.config().mode, AggregationMode::FailFast);
        let found = validator.violations(&schema(), &instance());
        assert_eq!(keywords(&found), vec!["required"]);
    }

    #[test]
    fn test_sibling_groups_report_in_declaration_order() {
        let schema = compile(json!({"not": {"type": "integer"}, "enum": [1]}));
        assert_eq!(keywords(&violations(&schema, json!(2))), vec!["not", "enum"]);
        let first = Validator::fail_fast().violations(&schema, &json!(2));
        assert_eq!(keywords(&first), vec!["not"]);

        let reversed = compile(json!({"enum": [1], "not": {"type": "integer"}}));
        let first = Validator::fail_fast().violations(&reversed, &json!(2));
        assert_eq!(keywords(&first), vec!["enum"]);
    }

    #[test]
    fn test_type_group_follows_its_first_keyword() {
        let schema = compile(json!({"maxLength": 1, "type": "string", "enum": ["a"]}));
        assert_eq!(keywords(&violations(&schema, json!("bc"))), vec!["maxLength", "enum"]);

        let schema = compile(json!({"enum": ["a"], "maxLength": 1}));
        assert_eq!(keywords(&violations(&schema, json!("bc"))), vec!["enum", "maxLength"]);
        let first = Validator::fail_fast().violations(&schema, &json!("bc"));
        assert_eq!(keywords(&first), vec!["enum"]);
    }

    #[test]
    fn test_max_errors() {
        let validator = Validator::new(ValidationConfig::collect_all().with_max_errors(2));
        assert_eq!(validator.violations(&schema(), &instance()).len(), 2);
    }

    #[test]
    fn test_batch() {
        let results = Validator::default().validate_batch(
            &schema(),
            &[json!({"name": "n"}), instance(), json!({"name": "m", "count": 11})],
        );
        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
        assert!(results[2].is_ok());
    }
}

#[cfg(test)]
mod objects {
    use super::*;

    #[test]
    fn test_object_keywords() {
        let schema = compile(json!({
            "type": "object",
            "properties": {"id": {"type": "integer"}},
            "patternProperties": {"^x-": {"type": "string"}},
            "additionalProperties": {"type": "boolean"},
            "minProperties": 1,
            "maxProperties": 3,
            "propertyNames": {"maxLength": 5},
            "dependencies": {"id": ["x-ref"]}
        }));

        assert!(schema.is_valid(&json!({"id": 1, "x-ref": "a", "flag": true})));

        let found = violations(&schema, json!({"id": 1}));
        assert_eq!(keywords(&found), vec!["dependencies"]);
        assert_eq!(found[0].message, "property [x-ref] is required by [id]");

        let found = violations(&schema, json!({"flag": 1}));
        assert_eq!(keywords(&found), vec!["type"]);
        assert_eq!(found[0].path.to_string(), "#/flag");

        let found = violations(&schema, json!({"toolong": true}));
        assert_eq!(keywords(&found), vec!["propertyNames"]);
        assert_eq!(keywords(&found[0].causes), vec!["maxLength"]);

        assert_eq!(keywords(&violations(&schema, json!({}))), vec!["minProperties"]);
        assert_eq!(keywords(&violations(&schema, json!([]))), vec!["type"]);
    }

    #[test]
    fn test_nested_paths_escape_keys() {
        let schema = compile(json!({
            "properties": {"a/b": {"items": {"type": "string"}}}
        }));
        let found = violations(&schema, json!({"a/b": ["ok", 7]}));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].path.to_string(), "#/a~1b/1");
    }
}

#[cfg(test)]
mod primitives {
    use super::*;

    #[test]
    fn test_string_keywords() {
        let schema = compile(json!({"type": "string", "minLength": 2, "maxLength": 4, "pattern": "^[a-z]+$"}));
        assert!(schema.is_valid(&json!("abc")));
        assert_eq!(keywords(&violations(&schema, json!("a"))), vec!["minLength"]);
        assert_eq!(keywords(&violations(&schema, json!("ABC"))), vec!["pattern"]);
        assert_eq!(keywords(&violations(&schema, json!("abcdef"))), vec!["maxLength"]);
    }

    #[test]
    fn test_length_counts_characters() {
        let schema = compile(json!({"maxLength": 3}));
        assert!(schema.is_valid(&json!("ééé")));
        assert!(!schema.is_valid(&json!("éééé")));
    }

    #[test]
    fn test_number_keywords() {
        let schema = compile(json!({
            "type": "number",
            "minimum": 0,
            "exclusiveMaximum": 1,
            "multipleOf": 0.25
        }));
        assert!(schema.is_valid(&json!(0)));
        assert!(schema.is_valid(&json!(0.75)));
        assert_eq!(keywords(&violations(&schema, json!(1))), vec!["exclusiveMaximum"]);
        assert_eq!(keywords(&violations(&schema, json!(-0.5))), vec!["minimum"]);
        assert_eq!(keywords(&violations(&schema, json!(0.3))), vec!["multipleOf"]);
    }

    #[test]
    fn test_integer_accepts_integral_floats() {
        let schema = compile(json!({"type": "integer"}));
        assert!(schema.is_valid(&json!(3)));
        assert!(schema.is_valid(&json!(3.0)));
        assert_eq!(keywords(&violations(&schema, json!(3.5))), vec!["type"]);
    }

    #[test]
    fn test_format() {
        let schema = compile(json!({"type": "string", "format": "email"}));
        assert!(schema.is_valid(&json!("dev@example.com")));
        let found = violations(&schema, json!("not-an-email"));
        assert_eq!(keywords(&found), vec!["format"]);
    }
}
