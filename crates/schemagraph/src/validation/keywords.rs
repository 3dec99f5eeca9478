//! Keyword checks for the typed variants
//!
//! Copyright (c) 2025 Schemagraph Authors
//! Licensed under the Apache-2.0 license

use super::context::ValidationContext;
use super::error::{PathToken, Violation};
use crate::schema::{
    Additional, ArraySchema, ConstSchema, Dependency, EnumSchema, Items, NumberSchema,
    ObjectSchema, SchemaLocation, StringSchema,
};
use crate::value::{deep_equals, describe, find_duplicate, is_integral};
use serde_json::{Map, Number, Value};

/// Tolerance used by `multipleOf` when either side is fractional
const MULTIPLE_OF_EPSILON: f64 = 1e-9;

/// Push violations and bail out of the enclosing function in fail-fast mode
macro_rules! collect {
    ($ctx:expr, $violations:ident, $new:expr) => {{
        $violations.extend($new);
        if $ctx.should_stop(&$violations) {
            return $violations;
        }
    }};
}

impl<'g> ValidationContext<'g> {
    pub(super) fn validate_enum(
        &self,
        schema: &EnumSchema,
        location: &SchemaLocation,
        instance: &Value,
    ) -> Vec<Violation> {
        if schema.values().iter().any(|v| deep_equals(v, instance)) {
            return Vec::new();
        }
        vec![self.violation(
            location,
            "enum",
            format!("{} is not a valid enum value", describe(instance)),
        )]
    }

    pub(super) fn validate_const(
        &self,
        schema: &ConstSchema,
        location: &SchemaLocation,
        instance: &Value,
    ) -> Vec<Violation> {
        if deep_equals(schema.value(), instance) {
            return Vec::new();
        }
        vec![self.violation(
            location,
            "const",
            format!("{} does not match the constant value", describe(instance)),
        )]
    }

    pub(super) fn validate_array(
        &mut self,
        schema: &ArraySchema,
        location: &SchemaLocation,
        instance: &Value,
    ) -> Vec<Violation> {
        let Value::Array(items) = instance else {
            return self.kind_violation(schema.requires_array(), location, "array", instance);
        };
        let len = items.len() as u64;
        let mut violations = Vec::new();

        if let Some(min) = schema.min_items() {
            if len < min {
                collect!(self, violations, [self.violation(
                    location,
                    "minItems",
                    format!("expected minimum item count: {}, found: {}", min, len),
                )]);
            }
        }
        if let Some(max) = schema.max_items() {
            if len > max {
                collect!(self, violations, [self.violation(
                    location,
                    "maxItems",
                    format!("expected maximum item count: {}, found: {}", max, len),
                )]);
            }
        }
        if schema.unique_items() {
            if let Some((first, second)) = find_duplicate(items) {
                collect!(self, violations, [self.violation(
                    location,
                    "uniqueItems",
                    format!("array items are not unique (indices {} and {})", first, second),
                )]);
            }
        }

        match schema.items() {
            Some(Items::All(item_schema)) => {
                for (index, item) in items.iter().enumerate() {
                    collect!(self, violations, self.descend(PathToken::Index(index), *item_schema, item));
                }
            }
            Some(Items::Tuple(tuple)) => {
                for (index, (item, item_schema)) in items.iter().zip(tuple).enumerate() {
                    collect!(self, violations, self.descend(PathToken::Index(index), *item_schema, item));
                }
                if items.len() > tuple.len() {
                    match schema.additional_items() {
                        Additional::Allow => {}
                        Additional::Deny => {
                            collect!(self, violations, [self.violation(
                                location,
                                "additionalItems",
                                format!("expected: {} array items, found: {}", tuple.len(), items.len()),
                            )]);
                        }
                        Additional::Schema(extra) => {
                            for (index, item) in items.iter().enumerate().skip(tuple.len()) {
                                collect!(self, violations, self.descend(PathToken::Index(index), extra, item));
                            }
                        }
                    }
                }
            }
            None => {}
        }

        if let Some(contains) = schema.contains() {
            if !items.iter().any(|item| self.matches(contains, item)) {
                collect!(self, violations, [self.violation(
                    location,
                    "contains",
                    "expected at least one array item to match 'contains' schema",
                )]);
            }
        }

        violations
    }

    pub(super) fn validate_object(
        &mut self,
        schema: &ObjectSchema,
        location: &SchemaLocation,
        instance: &Value,
    ) -> Vec<Violation> {
        let Value::Object(object) = instance else {
            return self.kind_violation(schema.requires_object(), location, "object", instance);
        };
        let count = object.len() as u64;
        let mut violations = Vec::new();

        if let Some(min) = schema.min_properties() {
            if count < min {
                collect!(self, violations, [self.violation(
                    location,
                    "minProperties",
                    format!("minimum size: [{}], found: [{}]", min, count),
                )]);
            }
        }
        if let Some(max) = schema.max_properties() {
            if count > max {
                collect!(self, violations, [self.violation(
                    location,
                    "maxProperties",
                    format!("maximum size: [{}], found: [{}]", max, count),
                )]);
            }
        }

        for key in schema.required() {
            if !object.contains_key(key) {
                collect!(self, violations, [self.violation(
                    location,
                    "required",
                    format!("required key [{}] not found", key),
                )]);
            }
        }

        for (key, property_schema) in schema.properties() {
            if let Some(value) = object.get(key) {
                collect!(self, violations, self.descend(PathToken::Key(key.clone()), *property_schema, value));
            }
        }

        for (key, value) in object {
            let mut matched = schema.property(key).is_some();
            for pattern in schema.pattern_properties() {
                if pattern.pattern().is_match(key) {
                    matched = true;
                    collect!(self, violations, self.descend(PathToken::Key(key.clone()), pattern.schema(), value));
                }
            }
            if matched {
                continue;
            }
            match schema.additional_properties() {
                Additional::Allow => {}
                Additional::Deny => {
                    collect!(self, violations, [self.violation(
                        location,
                        "additionalProperties",
                        format!("extraneous key [{}] is not permitted", key),
                    )]);
                }
                Additional::Schema(extra) => {
                    collect!(self, violations, self.descend(PathToken::Key(key.clone()), extra, value));
                }
            }
        }

        if let Some(names) = schema.property_names() {
            for key in object.keys() {
                let causes = self.validate(names, &Value::String(key.clone()));
                if !causes.is_empty() {
                    collect!(self, violations, [self
                        .violation(
                            location,
                            "propertyNames",
                            format!("property name [{}] is not valid", key),
                        )
                        .with_causes(causes)]);
                }
            }
        }

        collect!(self, violations, self.validate_dependencies(schema, location, instance, object));

        violations
    }

    fn validate_dependencies(
        &mut self,
        schema: &ObjectSchema,
        location: &SchemaLocation,
        instance: &Value,
        object: &Map<String, Value>,
    ) -> Vec<Violation> {
        let mut violations = Vec::new();
        for (key, dependency) in schema.dependencies() {
            if !object.contains_key(key) {
                continue;
            }
            match dependency {
                Dependency::Properties(required) => {
                    for needed in required {
                        if !object.contains_key(needed) {
                            collect!(self, violations, [self.violation(
                                location,
                                "dependencies",
                                format!("property [{}] is required by [{}]", needed, key),
                            )]);
                        }
                    }
                }
                Dependency::Schema(dependent) => {
                    collect!(self, violations, self.validate(*dependent, instance));
                }
            }
        }
        violations
    }

    pub(super) fn validate_string(
        &self,
        schema: &StringSchema,
        location: &SchemaLocation,
        instance: &Value,
    ) -> Vec<Violation> {
        let Value::String(text) = instance else {
            return self.kind_violation(schema.requires_string(), location, "string", instance);
        };
        let length = text.chars().count() as u64;
        let mut violations = Vec::new();

        if let Some(min) = schema.min_length() {
            if length < min {
                collect!(self, violations, [self.violation(
                    location,
                    "minLength",
                    format!("expected minLength: {}, actual: {}", min, length),
                )]);
            }
        }
        if let Some(max) = schema.max_length() {
            if length > max {
                collect!(self, violations, [self.violation(
                    location,
                    "maxLength",
                    format!("expected maxLength: {}, actual: {}", max, length),
                )]);
            }
        }
        if let Some(pattern) = schema.pattern() {
            if !pattern.is_match(text) {
                collect!(self, violations, [self.violation(
                    location,
                    "pattern",
                    format!("string [{}] does not match pattern {}", text, pattern.as_str()),
                )]);
            }
        }
        if let Some(format) = schema.format() {
            if !format.is_valid(text) {
                collect!(self, violations, [self.violation(
                    location,
                    "format",
                    format!("[{}] is not a valid {}", text, format.name()),
                )]);
            }
        }

        violations
    }

    pub(super) fn validate_number(
        &self,
        schema: &NumberSchema,
        location: &SchemaLocation,
        instance: &Value,
    ) -> Vec<Violation> {
        let expected = if schema.requires_integer() { "integer" } else { "number" };
        let Value::Number(number) = instance else {
            return self.kind_violation(schema.requires_number(), location, expected, instance);
        };
        if schema.requires_integer() && !is_integral(number) {
            return vec![self.violation(
                location,
                "type",
                "expected type: integer, found: number",
            )];
        }

        let Some(value) = number.as_f64() else {
            return Vec::new();
        };
        let mut violations = Vec::new();

        if let Some(minimum) = schema.minimum() {
            if value < minimum {
                collect!(self, violations, [self.violation(
                    location,
                    "minimum",
                    format!("{} is not greater or equal to {}", number, minimum),
                )]);
            }
        }
        if let Some(maximum) = schema.maximum() {
            if value > maximum {
                collect!(self, violations, [self.violation(
                    location,
                    "maximum",
                    format!("{} is not less or equal to {}", number, maximum),
                )]);
            }
        }
        if let Some(limit) = schema.exclusive_minimum() {
            if value <= limit {
                collect!(self, violations, [self.violation(
                    location,
                    "exclusiveMinimum",
                    format!("{} is not greater than {}", number, limit),
                )]);
            }
        }
        if let Some(limit) = schema.exclusive_maximum() {
            if value >= limit {
                collect!(self, violations, [self.violation(
                    location,
                    "exclusiveMaximum",
                    format!("{} is not less than {}", number, limit),
                )]);
            }
        }
        if let Some(divisor) = schema.multiple_of() {
            if !is_multiple_of(number, divisor) {
                collect!(self, violations, [self.violation(
                    location,
                    "multipleOf",
                    format!("{} is not a multiple of {}", number, divisor),
                )]);
            }
        }

        violations
    }

    /// Wrong-kind instances fail only when the node demands its kind
    fn kind_violation(
        &self,
        required: bool,
        location: &SchemaLocation,
        expected: &str,
        instance: &Value,
    ) -> Vec<Violation> {
        if required {
            vec![self.type_violation(location, expected, instance)]
        } else {
            Vec::new()
        }
    }
}

fn is_multiple_of(number: &Number, divisor: f64) -> bool {
    if divisor.fract() == 0.0 && divisor.abs() < i64::MAX as f64 {
        if let Some(value) = number.as_i64() {
            return value % (divisor as i64) == 0;
        }
    }
    let Some(value) = number.as_f64() else {
        return false;
    };
    let quotient = value / divisor;
    if !quotient.is_finite() {
        return false;
    }
    (quotient - quotient.round()).abs() <= MULTIPLE_OF_EPSILON * quotient.abs().max(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn number(value: Value) -> Number {
        match value {
            Value::Number(n) => n,
            other => panic!("not a number: {}", other),
        }
    }

    #[test]
    fn test_multiple_of_integers() {
        assert!(is_multiple_of(&number(json!(10)), 5.0));
        assert!(!is_multiple_of(&number(json!(7)), 2.0));
        assert!(is_multiple_of(&number(json!(-9)), 3.0));
    }

    #[test]
    fn test_multiple_of_fractions() {
        assert!(is_multiple_of(&number(json!(0.3)), 0.1));
        assert!(is_multiple_of(&number(json!(4.5)), 1.5));
        assert!(!is_multiple_of(&number(json!(0.35)), 0.1));
        assert!(is_multiple_of(&number(json!(7.0)), 0.5));
    }
}
