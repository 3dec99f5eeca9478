//! Error types and handling for the CLI
//!
//! This module provides error types and utilities for handling
//! various failure modes in the CLI application.
//!
//! Copyright (c) 2025 Schemagraph Authors
//! Licensed under the Apache-2.0 license

use schemagraph::loader::ParseError;
use schemagraph::LoadError;
use std::io;
use std::path::PathBuf;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for CLI operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error (file operations, etc.)
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The schema could not be loaded
    #[error("Schema error: {0}")]
    Load(#[from] LoadError),

    /// File not found
    #[error("File not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// A document could not be parsed
    #[error("Invalid document: {0}")]
    InvalidFormat(#[from] ParseError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// One or more documents failed validation
    #[error("{failed} of {total} document(s) failed validation")]
    ValidationFailed { failed: usize, total: usize },

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Io(_) | Self::Json(_) | Self::Yaml(_) => 1,
            Self::Load(_) => 2,
            Self::FileNotFound { .. } => 3,
            Self::InvalidFormat(_) => 4,
            Self::Config(_) => 5,
            Self::ValidationFailed { .. } => 6,
        }
    }

    /// Whether the failure was already reported through the output writer
    pub fn is_reported(&self) -> bool {
        matches!(self, Self::ValidationFailed { .. })
    }
}

/// Format an error for display to the user
pub fn format_error(error: &Error, use_color: bool) -> String {
    if use_color {
        use colored::Colorize;
        format!("{} {}", "Error:".red().bold(), error)
    } else {
        format!("Error: {}", error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(Error::config("bad").exit_code(), 5);
        assert_eq!(
            Error::FileNotFound {
                path: PathBuf::from("missing.json")
            }
            .exit_code(),
            3
        );
        assert_eq!(Error::ValidationFailed { failed: 1, total: 2 }.exit_code(), 6);
        assert_eq!(Error::from(io::Error::other("boom")).exit_code(), 1);
    }

    #[test]
    fn test_format_error_without_color() {
        let error = Error::ValidationFailed { failed: 2, total: 3 };
        assert_eq!(
            format_error(&error, false),
            "Error: 2 of 3 document(s) failed validation"
        );
        assert!(error.is_reported());
    }
}
