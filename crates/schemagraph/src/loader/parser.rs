//! Document parsing for JSON and YAML
//!
//! Copyright (c) 2025 Schemagraph Authors
//! Licensed under the Apache-2.0 license

use crate::loader::error::ParseError;
use serde_json::Value;
use std::path::Path;

/// Supported document formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// YAML format (.yaml, .yml)
    Yaml,
    /// JSON format (.json)
    Json,
}

impl Format {
    /// Detect format from file extension
    pub fn from_path(path: &Path) -> Result<Self, ParseError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase);
        match extension.as_deref() {
            Some("yaml") | Some("yml") => Ok(Format::Yaml),
            Some("json") => Ok(Format::Json),
            _ => Err(ParseError::unsupported_format(path.to_path_buf())),
        }
    }

    /// Get file extensions for this format
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Format::Yaml => &["yaml", "yml"],
            Format::Json => &["json"],
        }
    }
}

/// Turns JSON or YAML text into a document value
#[derive(Debug, Default, Clone, Copy)]
pub struct DocumentParser;

impl DocumentParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse a file, detecting format from extension
    pub fn parse_file(&self, path: &Path) -> Result<Value, ParseError> {
        let format = Format::from_path(path)?;
        let content =
            std::fs::read_to_string(path).map_err(|e| ParseError::io(path.to_path_buf(), e))?;

        tracing::debug!(path = %path.display(), ?format, "parsing document");
        self.parse_content(&content, format, &path.display())
    }

    /// Parse content with an explicit format; `origin` names the source in errors
    pub fn parse_content<O: ToString + ?Sized>(
        &self,
        content: &str,
        format: Format,
        origin: &O,
    ) -> Result<Value, ParseError> {
        match format {
            Format::Yaml => self.parse_yaml(content, origin),
            Format::Json => self.parse_json(content, origin),
        }
    }

    /// Parse YAML content
    pub fn parse_yaml<O: ToString + ?Sized>(&self, content: &str, origin: &O) -> Result<Value, ParseError> {
        // Parse as YAML first so YAML-specific errors keep their line info
        let yaml_value: serde_yaml::Value =
            serde_yaml::from_str(content).map_err(|e| ParseError::yaml(origin.to_string(), e))?;

        serde_json::to_value(yaml_value).map_err(|e| ParseError::json(origin.to_string(), e))
    }

    /// Parse JSON content
    pub fn parse_json<O: ToString + ?Sized>(&self, content: &str, origin: &O) -> Result<Value, ParseError> {
        serde_json::from_str(content).map_err(|e| ParseError::json(origin.to_string(), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_format_detection() {
        assert_eq!(Format::from_path(Path::new("a.yaml")).unwrap(), Format::Yaml);
        assert_eq!(Format::from_path(Path::new("a.YML")).unwrap(), Format::Yaml);
        assert_eq!(Format::from_path(Path::new("a.json")).unwrap(), Format::Json);
        assert!(Format::from_path(Path::new("a.txt")).is_err());
        assert!(Format::from_path(Path::new("schema")).is_err());
    }

    #[test]
    fn test_parse_yaml_schema() {
        let parser = DocumentParser::new();
        let yaml = "type: object\nproperties:\n  name:\n    type: string\n    minLength: 1\n";
        let value = parser.parse_yaml(yaml, "inline").unwrap();
        assert_eq!(value["properties"]["name"]["minLength"], json!(1));
    }

    #[test]
    fn test_parse_json_error_names_origin() {
        let parser = DocumentParser::new();
        let error = parser.parse_json("{\"type\": ", "inline.json").unwrap_err();
        assert!(matches!(error, ParseError::Json { .. }));
        assert!(error.to_string().contains("inline.json"));
    }

    #[test]
    fn test_parse_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("schema.json");
        fs::write(&path, r#"{"type": "integer"}"#).unwrap();

        let value = DocumentParser::new().parse_file(&path).unwrap();
        assert_eq!(value, json!({"type": "integer"}));

        let missing = DocumentParser::new()
            .parse_file(&dir.path().join("missing.json"))
            .unwrap_err();
        assert!(missing.is_not_found());
    }
}
