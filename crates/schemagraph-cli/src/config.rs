//! Configuration management for the CLI
//!
//! This module handles loading configuration from:
//! - Default values
//! - Configuration files (TOML/YAML/JSON)
//! - Command-line arguments, which override file values
//!
//! Copyright (c) 2025 Schemagraph Authors
//! Licensed under the Apache-2.0 license

use crate::cli::{LoadingArgs, OutputFormat};
use crate::error::{Error, Result};
use schemagraph::loader::CacheConfig;
use schemagraph::{LoaderConfig, ValidationConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Schema loading settings
    pub loader: LoaderConfig,

    /// Validation settings
    pub validation: ValidationConfig,

    /// External document cache settings
    pub cache: CacheSection,

    /// Logging settings
    pub logging: LoggingSection,

    /// Output settings
    pub output: OutputSection,
}

/// External document cache configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSection {
    /// Whether fetched documents are cached
    pub enabled: bool,

    /// Maximum number of cached documents
    pub max_entries: usize,

    /// Seconds before a cached document is refetched (0 = never)
    pub max_age_secs: u64,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level (trace, debug, info, warn, error); verbosity flags override it
    pub level: Option<String>,

    /// Log format (compact, full, json)
    pub format: String,
}

/// Output configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSection {
    /// Default output format (human, json, json-pretty, yaml)
    pub format: String,

    /// Use colored output by default
    pub color: bool,
}

impl Default for CacheSection {
    fn default() -> Self {
        let defaults = CacheConfig::default();
        Self {
            enabled: defaults.enabled,
            max_entries: defaults.max_entries,
            max_age_secs: defaults.max_age.map(|age| age.as_secs()).unwrap_or(0),
        }
    }
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: None,
            format: "compact".to_string(),
        }
    }
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            format: "human".to_string(),
            color: true,
        }
    }
}

impl CacheSection {
    pub fn to_cache_config(&self) -> CacheConfig {
        CacheConfig {
            max_entries: self.max_entries,
            max_age: (self.max_age_secs > 0).then(|| Duration::from_secs(self.max_age_secs)),
            enabled: self.enabled,
        }
    }
}

impl Config {
    /// Load configuration from a file, picking the format by extension
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let extension = path
            .extension()
            .and_then(|s| s.to_str())
            .map(str::to_ascii_lowercase);

        let parsed = match extension.as_deref() {
            Some("yaml") | Some("yml") => serde_yaml::from_str(&content).map_err(|e| e.to_string()),
            Some("json") => serde_json::from_str(&content).map_err(|e| e.to_string()),
            _ => toml::from_str(&content).map_err(|e| e.to_string()),
        };
        let config: Config =
            parsed.map_err(|e| Error::config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the first default location that exists
    pub fn load() -> Result<Self> {
        for path in Self::default_config_paths() {
            if path.exists() {
                tracing::debug!(path = %path.display(), "loading configuration");
                return Self::from_file(&path);
            }
        }
        Ok(Self::default())
    }

    /// Load configuration from a specific file or default locations
    pub fn load_with_file(file: Option<&Path>) -> Result<Self> {
        match file {
            Some(path) => Self::from_file(path),
            None => Self::load(),
        }
    }

    /// Default configuration file paths to check, in order
    fn default_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![
            PathBuf::from(".schemagraph.toml"),
            PathBuf::from(".schemagraph.yaml"),
            PathBuf::from(".schemagraph.json"),
        ];
        if let Some(config_dir) = dirs::config_dir() {
            let dir = config_dir.join("schemagraph");
            paths.push(dir.join("config.toml"));
            paths.push(dir.join("config.yaml"));
            paths.push(dir.join("config.json"));
        }
        paths
    }

    /// Reject values serde accepts but the CLI cannot use
    pub fn validate(&self) -> Result<()> {
        if OutputFormat::from_name(&self.output.format).is_none() {
            return Err(Error::config(format!(
                "unknown output format '{}'",
                self.output.format
            )));
        }
        if !matches!(self.logging.format.as_str(), "compact" | "full" | "json") {
            return Err(Error::config(format!(
                "unknown log format '{}'",
                self.logging.format
            )));
        }
        if self.loader.max_reference_depth == 0 {
            return Err(Error::config("loader.max_reference_depth must be positive"));
        }
        Ok(())
    }

    /// Output format from the file, unless the command line names one
    pub fn output_format(&self, flag: Option<OutputFormat>) -> OutputFormat {
        flag.or_else(|| OutputFormat::from_name(&self.output.format))
            .unwrap_or(OutputFormat::Human)
    }

    /// Loader configuration with command-line overrides applied
    pub fn loader_config(&self, args: &LoadingArgs) -> LoaderConfig {
        let mut config = self.loader.clone();
        if let Some(policy) = args.multi_type {
            config = config.with_multi_type_policy(policy.into());
        }
        if args.no_formats {
            config = config.with_validate_formats(false);
        }
        config
    }

    /// Validation configuration with command-line overrides applied
    pub fn validation_config(&self, fail_fast: bool, max_errors: Option<usize>) -> ValidationConfig {
        let mut config = if fail_fast {
            ValidationConfig::fail_fast()
        } else {
            self.validation.clone()
        };
        if let Some(max_errors) = max_errors {
            config = config.with_max_errors(max_errors);
        }
        config
    }
}
