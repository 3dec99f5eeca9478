//! Validate command handler
//!
//! Copyright (c) 2025 Schemagraph Authors
//! Licensed under the Apache-2.0 license

use super::utils::{build_loader, load_schema, read_document};
use crate::cli::ValidateArgs;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::logging::timing::Timer;
use crate::output::{InstanceReport, OutputWriter, ValidationReport};
use schemagraph::Validator;
use tracing::{debug, info, instrument, warn};

/// Handle the validate command
#[instrument(skip_all, fields(schema = %args.schema.display(), instances = args.instances.len()))]
pub fn handle_validate(args: ValidateArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let loader = build_loader(config, &args.loading);
    let schema = {
        let _timer = Timer::with_details("schema_loading", &args.schema.display().to_string());
        load_schema(&loader, &args.schema)?
    };
    debug!(nodes = schema.graph().len(), "schema compiled");
    output.info(&format!(
        "Validating {} document(s) against {}",
        args.instances.len(),
        args.schema.display()
    ))?;

    let validator = Validator::new(config.validation_config(args.fail_fast, args.max_errors));
    let mut results = Vec::with_capacity(args.instances.len());
    for path in &args.instances {
        let _timer = Timer::with_details("instance_validation", &path.display().to_string());
        let instance = read_document(path)?;
        let violations = validator.violations(&schema, &instance);
        if violations.is_empty() {
            info!(instance = %path.display(), "document is valid");
        } else {
            warn!(instance = %path.display(), violations = violations.len(), "document is invalid");
        }
        results.push(InstanceReport {
            instance: path.display().to_string(),
            valid: violations.is_empty(),
            violations,
        });
    }

    let report = ValidationReport {
        schema: args.schema.display().to_string(),
        results,
    };
    output.validation_report(&report)?;

    match report.failed() {
        0 => Ok(()),
        failed => Err(Error::ValidationFailed {
            failed,
            total: report.results.len(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{LoadingArgs, OutputFormat};
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn args(schema: PathBuf, instances: Vec<PathBuf>) -> ValidateArgs {
        ValidateArgs {
            schema,
            instances,
            fail_fast: false,
            max_errors: None,
            loading: LoadingArgs::default(),
        }
    }

    fn quiet_output() -> OutputWriter {
        OutputWriter::with_writer(OutputFormat::Json, false, true, Box::new(std::io::sink()))
    }

    #[test]
    fn test_validate_reports_failures() {
        let dir = TempDir::new().unwrap();
        let schema = write(&dir, "schema.yaml", "type: array\nitems:\n  type: integer\n");
        let good = write(&dir, "good.json", "[1, 2, 3]");
        let bad = write(&dir, "bad.json", "[1, \"two\"]");

        let result = handle_validate(args(schema.clone(), vec![good.clone()]), &Config::default(), &mut quiet_output());
        assert!(result.is_ok());

        let error = handle_validate(args(schema, vec![good, bad]), &Config::default(), &mut quiet_output())
            .unwrap_err();
        assert!(matches!(error, Error::ValidationFailed { failed: 1, total: 2 }));
        assert_eq!(error.exit_code(), 6);
    }

    #[test]
    fn test_validate_missing_instance() {
        let dir = TempDir::new().unwrap();
        let schema = write(&dir, "schema.json", "{}");
        let error = handle_validate(
            args(schema, vec![dir.path().join("missing.json")]),
            &Config::default(),
            &mut quiet_output(),
        )
        .unwrap_err();
        assert_eq!(error.exit_code(), 3);
    }
}
