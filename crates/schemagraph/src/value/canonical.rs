//! Canonical value form and representation-agnostic deep equality
//!
//! Literals from `enum` and `const` are canonicalized once when a schema is
//! loaded; instance values are compared with [`deep_equals`], which treats
//! `1` and `1.0` as the same number. Nothing else in the crate compares
//! values directly.
//!
//! Copyright (c) 2025 Schemagraph Authors
//! Licensed under the Apache-2.0 license

use serde_json::{Map, Number, Value};
use std::collections::HashMap;

/// Largest float magnitude that still maps onto an `i64` exactly
const I64_SAFE_BOUND: f64 = 9_223_372_036_854_775_808.0;

/// 2^127; every integral float below it converts to `i128` exactly
const I128_SAFE_BOUND: f64 = 170_141_183_460_469_231_731_687_303_715_884_105_728.0;

/// Rewrite a value into its canonical form
///
/// Integral floats become integers; containers are rebuilt recursively.
/// Mapping order is kept so diagnostics can echo literals as written.
pub fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Number(n) => Value::Number(canonical_number(n)),
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        Value::Object(entries) => {
            let mut canonical = Map::with_capacity(entries.len());
            for (key, item) in entries {
                canonical.insert(key.clone(), canonicalize(item));
            }
            Value::Object(canonical)
        }
        other => other.clone(),
    }
}

fn canonical_number(number: &Number) -> Number {
    if number.is_i64() || number.is_u64() {
        return number.clone();
    }
    match number.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() < I64_SAFE_BOUND => Number::from(f as i64),
        _ => number.clone(),
    }
}

/// Structural equality over JSON values
///
/// Numbers compare by numeric value, sequences element-wise in order,
/// mappings by key set and per-key value. A kind mismatch is never equal.
pub fn deep_equals(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Number(a), Value::Number(b)) => numbers_equal(a, b),
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| deep_equals(x, y))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a.iter()
                    .all(|(key, x)| b.get(key).map_or(false, |y| deep_equals(x, y)))
        }
        _ => false,
    }
}

fn numbers_equal(a: &Number, b: &Number) -> bool {
    match (integer_value(a), integer_value(b)) {
        (Some(x), Some(y)) => x == y,
        _ => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        },
    }
}

/// Exact integer value of an integral number, whatever its representation
///
/// Equality and duplicate hashing both go through this, so they agree on
/// which numbers are the same.
fn integer_value(number: &Number) -> Option<i128> {
    if let Some(i) = number.as_i64() {
        return Some(i as i128);
    }
    if let Some(u) = number.as_u64() {
        return Some(u as i128);
    }
    match number.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() < I128_SAFE_BOUND => Some(f as i128),
        _ => None,
    }
}

/// Hashable key for scalar values, used to find duplicates without the
/// quadratic pairwise scan
#[derive(Debug, PartialEq, Eq, Hash)]
enum ScalarKey<'a> {
    Null,
    Bool(bool),
    Integer(i128),
    Float(u64),
    Str(&'a str),
}

fn scalar_key(value: &Value) -> Option<ScalarKey<'_>> {
    match value {
        Value::Null => Some(ScalarKey::Null),
        Value::Bool(b) => Some(ScalarKey::Bool(*b)),
        Value::String(s) => Some(ScalarKey::Str(s)),
        Value::Number(n) => match integer_value(n) {
            Some(i) => Some(ScalarKey::Integer(i)),
            None => n.as_f64().map(|f| ScalarKey::Float(f.to_bits())),
        },
        Value::Array(_) | Value::Object(_) => None,
    }
}

/// Find the first pair of deep-equal items, returned as `(earlier, later)`
///
/// Arrays made only of scalars take a hashing pass; anything containing a
/// container falls back to pairwise comparison. Both paths agree on the result.
pub fn find_duplicate(items: &[Value]) -> Option<(usize, usize)> {
    let keys: Option<Vec<ScalarKey<'_>>> = items.iter().map(scalar_key).collect();
    match keys {
        Some(keys) => {
            let mut seen: HashMap<ScalarKey<'_>, usize> = HashMap::with_capacity(keys.len());
            for (index, key) in keys.into_iter().enumerate() {
                if let Some(&first) = seen.get(&key) {
                    return Some((first, index));
                }
                seen.insert(key, index);
            }
            None
        }
        None => {
            for later in 1..items.len() {
                for earlier in 0..later {
                    if deep_equals(&items[earlier], &items[later]) {
                        return Some((earlier, later));
                    }
                }
            }
            None
        }
    }
}
