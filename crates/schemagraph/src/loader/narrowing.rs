//! Type-narrowing dispatch over keyword values
//!
//! Many keywords accept several JSON kinds with different meanings (`items`
//! is either a schema or a tuple, `additionalProperties` is either a boolean
//! or a schema). [`KindDispatch`] tries the accepted kinds in order, runs the
//! handler of the first one that matches, and reports a
//! [`TypeMismatchError`] listing every accepted kind otherwise.
//!
//! Copyright (c) 2025 Schemagraph Authors
//! Licensed under the Apache-2.0 license

use crate::loader::error::{LoadResult, TypeMismatchError};
use crate::schema::SchemaLocation;
use crate::value::ValueKind;
use serde_json::Value;

/// Kinds accepted wherever a subschema is expected
pub const SCHEMA_KINDS: &[ValueKind] = &[ValueKind::Object, ValueKind::Boolean];

pub struct KindDispatch<'a, T> {
    keyword: &'a str,
    value: &'a Value,
    location: &'a SchemaLocation,
    expected: Vec<ValueKind>,
    outcome: Option<LoadResult<T>>,
}

impl<'a, T> KindDispatch<'a, T> {
    /// Start dispatching the value of `keyword` found at `location`
    pub fn new(keyword: &'a str, value: &'a Value, location: &'a SchemaLocation) -> Self {
        Self {
            keyword,
            value,
            location,
            expected: Vec::new(),
            outcome: None,
        }
    }

    /// Handle values of `kind`, unless an earlier candidate already matched
    pub fn on<H>(self, kind: ValueKind, handler: H) -> Self
    where
        H: FnOnce(&'a Value) -> LoadResult<T>,
    {
        self.on_any(&[kind], handler)
    }

    /// Handle values of any of `kinds` with one handler
    pub fn on_any<H>(mut self, kinds: &[ValueKind], handler: H) -> Self
    where
        H: FnOnce(&'a Value) -> LoadResult<T>,
    {
        self.expected.extend_from_slice(kinds);
        if self.outcome.is_none() && kinds.contains(&ValueKind::of(self.value)) {
            self.outcome = Some(handler(self.value));
        }
        self
    }

    /// Outcome of the matching handler, or a type mismatch
    pub fn finish(self) -> LoadResult<T> {
        match self.outcome {
            Some(outcome) => outcome,
            None => Err(TypeMismatchError {
                keyword: self.keyword.to_string(),
                location: self.location.to_string(),
                expected: self.expected,
                actual: ValueKind::of(self.value),
            }
            .into()),
        }
    }
}

/// Require a single kind for a keyword value
pub fn require<'a>(
    keyword: &'a str,
    value: &'a Value,
    location: &'a SchemaLocation,
    kind: ValueKind,
) -> LoadResult<&'a Value> {
    KindDispatch::new(keyword, value, location)
        .on(kind, Ok)
        .finish()
}
