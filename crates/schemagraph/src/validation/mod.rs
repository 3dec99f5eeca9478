//! Validation of JSON instances against compiled schema graphs
//!
//! A [`Validator`] walks a [`CompiledSchema`] read-only. Every call gets its
//! own traversal state, so a single compiled schema can be shared across
//! threads and validated against concurrently.
//!
//! Two aggregation modes are supported:
//!
//! - **CollectAll**: gather every violation, optionally capped at `max_errors`
//! - **FailFast**: stop at the first violation
//!
//! Copyright (c) 2025 Schemagraph Authors
//! Licensed under the Apache-2.0 license

mod context;
pub mod error;
mod keywords;

pub use context::ValidationContext;
pub use error::{FailureReason, InstancePath, PathToken, ValidationFailure, Violation};

use crate::schema::CompiledSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Result type for validation operations
pub type ValidationResult<T = ()> = Result<T, ValidationFailure>;

/// How violations are aggregated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationMode {
    /// Collect every violation
    #[default]
    CollectAll,
    /// Stop at the first violation
    FailFast,
}

/// Validation configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Aggregation mode to use
    pub mode: AggregationMode,
    /// Maximum number of top-level violations to report (0 = unlimited)
    pub max_errors: usize,
}

impl ValidationConfig {
    /// Collect every violation
    pub fn collect_all() -> Self {
        Self::default()
    }

    /// Stop at the first violation
    pub fn fail_fast() -> Self {
        Self {
            mode: AggregationMode::FailFast,
            max_errors: 0,
        }
    }

    /// Set maximum number of violations to report
    pub fn with_max_errors(mut self, max_errors: usize) -> Self {
        self.max_errors = max_errors;
        self
    }
}

/// Entry point for validating instances
#[derive(Debug, Clone, Default)]
pub struct Validator {
    config: ValidationConfig,
}

impl Validator {
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Validator that stops at the first violation
    pub fn fail_fast() -> Self {
        Self::new(ValidationConfig::fail_fast())
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Every violation (subject to the configured limits); empty means valid
    pub fn violations(&self, schema: &CompiledSchema, instance: &Value) -> Vec<Violation> {
        let mut context = ValidationContext::new(schema.graph(), self.config.mode);
        let mut violations = context.validate(schema.root(), instance);

        let limit = match self.config.mode {
            AggregationMode::FailFast => 1,
            AggregationMode::CollectAll => self.config.max_errors,
        };
        if limit > 0 {
            violations.truncate(limit);
        }

        tracing::debug!(
            root = %schema.root(),
            violations = violations.len(),
            mode = ?self.config.mode,
            "validation finished"
        );
        violations
    }

    /// Validate one instance
    pub fn validate(&self, schema: &CompiledSchema, instance: &Value) -> ValidationResult {
        ValidationFailure::into_result(self.violations(schema, instance))
    }

    /// Validate several instances, returning one result per instance
    ///
    /// In fail-fast mode the batch stops after the first invalid instance, so
    /// the returned vector may be shorter than `instances`.
    pub fn validate_batch(
        &self,
        schema: &CompiledSchema,
        instances: &[Value],
    ) -> Vec<ValidationResult> {
        let mut results = Vec::with_capacity(instances.len());
        for instance in instances {
            let result = self.validate(schema, instance);
            let failed = result.is_err();
            results.push(result);
            if failed && self.config.mode == AggregationMode::FailFast {
                break;
            }
        }
        results
    }
}
