//! Output formatting and writing utilities
//!
//! This module provides utilities for writing command results in various
//! formats (JSON, YAML, human-readable), including nested violation trees.
//!
//! Copyright (c) 2025 Schemagraph Authors
//! Licensed under the Apache-2.0 license

use crate::cli::OutputFormat;
use crate::error::Result;
use colored::Colorize;
use schemagraph::Violation;
use serde::Serialize;
use std::io::{self, Write};
use tracing::trace;

/// Outcome of validating one document
#[derive(Debug, Clone, Serialize)]
pub struct InstanceReport {
    pub instance: String,
    pub valid: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<Violation>,
}

/// Outcome of a `validate` run
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub schema: String,
    pub results: Vec<InstanceReport>,
}

impl ValidationReport {
    /// Number of documents that failed
    pub fn failed(&self) -> usize {
        self.results.iter().filter(|r| !r.valid).count()
    }
}

/// Outcome of a `check` run
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub schema: String,
    pub valid: bool,
    /// Number of nodes in the compiled graph
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nodes: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Trait for formatting output
pub trait OutputFormatter {
    /// Format a serializable value
    fn format<T: Serialize>(&self, value: &T) -> Result<String>;
}

impl OutputFormatter for OutputFormat {
    fn format<T: Serialize>(&self, value: &T) -> Result<String> {
        match self {
            OutputFormat::Json => Ok(serde_json::to_string(value)?),
            OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(value)?),
            OutputFormat::Yaml => Ok(serde_yaml::to_string(value)?),
            // Human output has dedicated renderers; this is the fallback
            OutputFormat::Human => Ok(serde_json::to_string_pretty(value)?),
        }
    }
}

/// Output writer that handles different output formats and colors
pub struct OutputWriter {
    format: OutputFormat,
    use_color: bool,
    quiet: bool,
    writer: Box<dyn Write>,
}

impl OutputWriter {
    /// Create a new output writer on stdout
    pub fn new(format: OutputFormat, use_color: bool, quiet: bool) -> Self {
        Self::with_writer(format, use_color, quiet, Box::new(io::stdout()))
    }

    /// Create an output writer with a custom writer
    pub fn with_writer(
        format: OutputFormat,
        use_color: bool,
        quiet: bool,
        writer: Box<dyn Write>,
    ) -> Self {
        Self {
            format,
            use_color,
            quiet,
            writer,
        }
    }

    fn is_human(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Write a line of output
    pub fn writeln(&mut self, content: &str) -> Result<()> {
        writeln!(self.writer, "{}", content)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Write an info message
    pub fn info(&mut self, message: &str) -> Result<()> {
        if self.quiet || !self.is_human() {
            return Ok(());
        }
        if self.use_color {
            self.writeln(&format!("{} {}", "ℹ".blue(), message))
        } else {
            self.writeln(&format!("INFO: {}", message))
        }
    }

    /// Write data in the configured format
    pub fn data<T: Serialize>(&mut self, value: &T) -> Result<()> {
        let formatted = self.format.format(value)?;
        trace!(bytes = formatted.len(), "writing structured output");
        self.writeln(formatted.trim_end())
    }

    /// Write the results of a `validate` run
    pub fn validation_report(&mut self, report: &ValidationReport) -> Result<()> {
        if !self.is_human() {
            return self.data(report);
        }
        let rendered = format_validation_report_human(report, self.use_color, self.quiet);
        if rendered.is_empty() {
            return Ok(());
        }
        self.writeln(rendered.trim_end())
    }

    /// Write the result of a `check` run
    pub fn check_report(&mut self, report: &CheckReport) -> Result<()> {
        if !self.is_human() {
            return self.data(report);
        }
        if self.quiet || !report.valid {
            // Failures are reported on stderr by the caller
            return Ok(());
        }
        let message = format!(
            "✓ {} compiles ({} nodes)",
            report.schema,
            report.nodes.unwrap_or_default()
        );
        if self.use_color {
            self.writeln(&message.green().to_string())
        } else {
            self.writeln(&message)
        }
    }
}

/// Render a validation report for human reading
///
/// Quiet mode keeps only the failing documents.
pub fn format_validation_report_human(report: &ValidationReport, use_color: bool, quiet: bool) -> String {
    let mut output = String::new();

    for result in &report.results {
        if result.valid {
            if !quiet {
                let line = format!("✓ {}", result.instance);
                output.push_str(&paint(&line, use_color, Paint::Success));
                output.push('\n');
            }
            continue;
        }

        let line = format!(
            "✗ {}: {} violation(s)",
            result.instance,
            result.violations.len()
        );
        output.push_str(&paint(&line, use_color, Paint::Failure));
        output.push('\n');
        for violation in &result.violations {
            format_violation_human(violation, 1, use_color, &mut output);
        }
    }

    if !quiet && report.results.len() > 1 {
        output.push_str(&format!(
            "\n{} of {} document(s) valid\n",
            report.results.len() - report.failed(),
            report.results.len()
        ));
    }
    output
}

/// Render one violation and its causes, indented by depth
fn format_violation_human(violation: &Violation, depth: usize, use_color: bool, output: &mut String) {
    let indent = "  ".repeat(depth);
    let keyword = format!("[{}]", violation.keyword);
    output.push_str(&format!(
        "{}{} {} {}\n",
        indent,
        paint(&violation.path.to_string(), use_color, Paint::Path),
        paint(&keyword, use_color, Paint::Keyword),
        violation.message
    ));
    output.push_str(&format!(
        "{}  {}\n",
        indent,
        paint(&format!("at {}", violation.schema_location), use_color, Paint::Dim)
    ));
    for cause in &violation.causes {
        format_violation_human(cause, depth + 1, use_color, output);
    }
}

#[derive(Clone, Copy)]
enum Paint {
    Success,
    Failure,
    Path,
    Keyword,
    Dim,
}

fn paint(text: &str, use_color: bool, paint: Paint) -> String {
    if !use_color {
        return text.to_string();
    }
    match paint {
        Paint::Success => text.green().to_string(),
        Paint::Failure => text.red().bold().to_string(),
        Paint::Path => text.cyan().to_string(),
        Paint::Keyword => text.yellow().to_string(),
        Paint::Dim => text.dimmed().to_string(),
    }
}
