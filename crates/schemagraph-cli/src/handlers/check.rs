//! Check command handler
//!
//! Copyright (c) 2025 Schemagraph Authors
//! Licensed under the Apache-2.0 license

use super::utils::{build_loader, load_schema};
use crate::cli::CheckArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::{CheckReport, OutputWriter};
use tracing::instrument;

/// Handle the check command: compile the schema and report its size
#[instrument(skip_all, fields(schema = %args.schema.display()))]
pub fn handle_check(args: CheckArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let loader = build_loader(config, &args.loading);
    let schema = args.schema.display().to_string();

    match load_schema(&loader, &args.schema) {
        Ok(compiled) => output.check_report(&CheckReport {
            schema,
            valid: true,
            nodes: Some(compiled.graph().len()),
            error: None,
        }),
        Err(error) => {
            output.check_report(&CheckReport {
                schema,
                valid: false,
                nodes: None,
                error: Some(error.to_string()),
            })?;
            Err(error)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{LoadingArgs, OutputFormat};
    use std::fs;
    use tempfile::TempDir;

    fn check(content: &str) -> Result<()> {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("schema.json");
        fs::write(&path, content).unwrap();
        let mut output =
            OutputWriter::with_writer(OutputFormat::Human, false, true, Box::new(std::io::sink()));
        handle_check(
            CheckArgs {
                schema: path,
                loading: LoadingArgs::default(),
            },
            &Config::default(),
            &mut output,
        )
    }

    #[test]
    fn test_check() {
        assert!(check(r##"{"definitions": {"a": {"$ref": "#"}}, "$ref": "#/definitions/a"}"##).is_ok());

        let error = check(r##"{"$ref": "#/definitions/missing"}"##).unwrap_err();
        assert_eq!(error.exit_code(), 2);

        let error = check(r#"{"type": 7}"#).unwrap_err();
        assert_eq!(error.exit_code(), 2);
    }
}
