//! Command-line interface argument parsing and definitions
//!
//! This module defines the CLI structure using clap's derive API,
//! providing a type-safe and well-documented command interface.
//!
//! Copyright (c) 2025 Schemagraph Authors
//! Licensed under the Apache-2.0 license

use clap::{Parser, Subcommand, ValueEnum};
use is_terminal::IsTerminal;
use schemagraph::MultiTypePolicy;
use std::path::PathBuf;

/// Schemagraph CLI - compile JSON Schemas and validate documents against them
///
/// Schemas and instances may be written in JSON or YAML. External `$ref`
/// targets are read from the local filesystem.
#[derive(Parser, Debug)]
#[command(
    name = "schemagraph",
    version,
    author,
    about,
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Enable verbose output (can be used multiple times for increased verbosity)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "SCHEMAGRAPH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format for results
    #[arg(short, long, value_enum, global = true)]
    pub output: Option<OutputFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate one or more documents against a schema
    Validate(ValidateArgs),

    /// Load and compile a schema without validating anything
    Check(CheckArgs),
}

/// Arguments for the validate command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to the schema file (JSON or YAML)
    #[arg(short, long, value_name = "SCHEMA")]
    pub schema: PathBuf,

    /// Documents to validate (JSON or YAML)
    #[arg(value_name = "INSTANCE", required = true)]
    pub instances: Vec<PathBuf>,

    /// Stop at the first violation
    #[arg(long)]
    pub fail_fast: bool,

    /// Maximum number of violations to report per document (0 = unlimited)
    #[arg(long, value_name = "N")]
    pub max_errors: Option<usize>,

    #[command(flatten)]
    pub loading: LoadingArgs,
}

/// Arguments for the check command
#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Path to the schema file (JSON or YAML)
    #[arg(value_name = "SCHEMA")]
    pub schema: PathBuf,

    #[command(flatten)]
    pub loading: LoadingArgs,
}

/// Options that affect how schemas are loaded
#[derive(Parser, Debug, Default)]
pub struct LoadingArgs {
    /// Only resolve external references inside this directory
    #[arg(long, value_name = "DIR")]
    pub fetch_root: Option<PathBuf>,

    /// How to treat keywords of several primitive types on one schema
    #[arg(long, value_enum, value_name = "POLICY")]
    pub multi_type: Option<MultiTypeArg>,

    /// Do not enforce `format`
    #[arg(long)]
    pub no_formats: bool,
}

/// Output format options
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable formatted output
    Human,
    /// JSON output
    Json,
    /// Pretty-printed JSON output
    JsonPretty,
    /// YAML output
    Yaml,
}

impl OutputFormat {
    /// Parse the format name used in configuration files
    pub fn from_name(name: &str) -> Option<Self> {
        <Self as ValueEnum>::from_str(name, true).ok()
    }
}

/// Multi-type policy as accepted on the command line
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum MultiTypeArg {
    /// Each group only constrains values of its own type
    Conjunction,
    /// Refuse schemas that mix keyword groups without `type`
    Reject,
}

impl From<MultiTypeArg> for MultiTypePolicy {
    fn from(arg: MultiTypeArg) -> Self {
        match arg {
            MultiTypeArg::Conjunction => MultiTypePolicy::Conjunction,
            MultiTypeArg::Reject => MultiTypePolicy::Reject,
        }
    }
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the effective verbosity level (considering quiet flag)
    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }

    /// Check if colored output should be used
    pub fn use_color(&self) -> bool {
        !self.no_color && std::io::stdout().is_terminal()
    }
}
