//! Error types for schema loading operations
//!
//! Copyright (c) 2025 Schemagraph Authors
//! Licensed under the Apache-2.0 license

use crate::schema::{BuildError, GraphError, SchemaLocation};
use crate::value::ValueKind;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for loader operations
pub type LoadResult<T> = Result<T, LoadError>;

/// Fatal errors raised while compiling a schema document
///
/// Loading produces no partial output: the first error aborts the whole load.
#[derive(Error, Debug)]
pub enum LoadError {
    /// A keyword has an illegal value (negative count, bad regex, inverted range)
    #[error("invalid schema at '{location}': {reason}")]
    InvalidSchema { location: String, reason: String },

    /// A keyword value has the wrong JSON kind
    #[error(transparent)]
    TypeMismatch(#[from] TypeMismatchError),

    /// A `$ref` could not be resolved
    #[error(transparent)]
    Reference(#[from] ReferenceResolutionError),

    /// Keyword groups of several primitive types on one node under
    /// `MultiTypePolicy::Reject`
    #[error("schema at '{location}' mixes keywords of several types: {}", .groups.join(", "))]
    ConflictingTypeGroups { location: String, groups: Vec<String> },

    /// The base URI passed to the loader is not an absolute URI
    #[error("invalid base URI '{uri}': {reason}")]
    InvalidBaseUri { uri: String, reason: String },

    /// `$ref` chains nested deeper than the configured limit
    #[error("reference nesting at '{location}' exceeds the limit of {limit}")]
    ReferenceDepthExceeded { location: String, limit: usize },

    /// The input document could not be parsed
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Arena misuse; indicates a loader bug rather than a bad document
    #[error(transparent)]
    Graph(#[from] GraphError),
}

impl LoadError {
    /// Create an invalid-schema error
    pub fn invalid_schema<R: Into<String>>(location: &SchemaLocation, reason: R) -> Self {
        Self::InvalidSchema {
            location: location.to_string(),
            reason: reason.into(),
        }
    }

    /// Attach a location to a builder failure
    pub fn from_build(location: &SchemaLocation, error: BuildError) -> Self {
        Self::invalid_schema(location, error.to_string())
    }

    /// Create a conflicting-groups error
    pub fn conflicting_type_groups(location: &SchemaLocation, groups: Vec<String>) -> Self {
        Self::ConflictingTypeGroups {
            location: location.to_string(),
            groups,
        }
    }

    /// Create an invalid base URI error
    pub fn invalid_base_uri<U: Into<String>, R: ToString>(uri: U, reason: R) -> Self {
        Self::InvalidBaseUri {
            uri: uri.into(),
            reason: reason.to_string(),
        }
    }

    /// Schema location associated with this error, if any
    pub fn location(&self) -> Option<&str> {
        match self {
            Self::InvalidSchema { location, .. } => Some(location.as_str()),
            Self::TypeMismatch(error) => Some(error.location.as_str()),
            Self::Reference(error) => error.location(),
            Self::ConflictingTypeGroups { location, .. } => Some(location.as_str()),
            Self::ReferenceDepthExceeded { location, .. } => Some(location.as_str()),
            _ => None,
        }
    }
}

/// A keyword whose value has none of the accepted JSON kinds
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{keyword} at '{location}': expected {}, found {actual}", ExpectedKinds(.expected))]
pub struct TypeMismatchError {
    pub keyword: String,
    pub location: String,
    pub expected: Vec<ValueKind>,
    pub actual: ValueKind,
}

struct ExpectedKinds<'a>(&'a [ValueKind]);

impl fmt::Display for ExpectedKinds<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, kind) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" or ")?;
            }
            write!(f, "{}", kind)?;
        }
        Ok(())
    }
}

/// Failures resolving a `$ref`
#[derive(Error, Debug)]
pub enum ReferenceResolutionError {
    /// The reference is not a valid URI reference
    #[error("invalid reference '{reference}' at '{location}': {reason}")]
    InvalidUri {
        reference: String,
        location: String,
        reason: String,
    },

    /// The JSON pointer does not lead anywhere in the target document
    #[error("unresolvable pointer '{pointer}' in '{document}' (referenced at '{location}'): {reason}")]
    UnresolvablePointer {
        document: String,
        pointer: String,
        location: String,
        reason: String,
    },

    /// The external document could not be retrieved
    #[error("failed to fetch '{uri}' (referenced at '{location}'): {source}")]
    Fetch {
        uri: String,
        location: String,
        source: FetchError,
    },

    /// The pointer leads to a value that is neither an object nor a boolean
    #[error("reference '{reference}' at '{location}' points to a {actual}, not a schema")]
    WrongKind {
        reference: String,
        location: String,
        actual: ValueKind,
    },
}

impl ReferenceResolutionError {
    /// Create an invalid URI error
    pub fn invalid_uri<R: Into<String>, E: ToString>(
        reference: R,
        location: &SchemaLocation,
        reason: E,
    ) -> Self {
        Self::InvalidUri {
            reference: reference.into(),
            location: location.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create an unresolvable pointer error
    pub fn unresolvable_pointer<E: ToString>(
        document: &str,
        pointer: &str,
        location: &SchemaLocation,
        reason: E,
    ) -> Self {
        Self::UnresolvablePointer {
            document: document.to_string(),
            pointer: pointer.to_string(),
            location: location.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create a fetch error
    pub fn fetch<U: ToString>(uri: U, location: &SchemaLocation, source: FetchError) -> Self {
        Self::Fetch {
            uri: uri.to_string(),
            location: location.to_string(),
            source,
        }
    }

    /// Schema location of the `$ref` that failed
    pub fn location(&self) -> Option<&str> {
        match self {
            Self::InvalidUri { location, .. }
            | Self::UnresolvablePointer { location, .. }
            | Self::Fetch { location, .. }
            | Self::WrongKind { location, .. } => Some(location.as_str()),
        }
    }
}

/// Failures retrieving an external document
#[derive(Error, Debug)]
pub enum FetchError {
    /// Remote retrieval is not enabled on this loader
    #[error("fetching external documents is disabled (requested '{uri}')")]
    Disabled { uri: String },

    /// No document is known under this URI
    #[error("document not found: {uri}")]
    NotFound { uri: String },

    /// The fetcher cannot handle this URI scheme
    #[error("unsupported URI scheme '{scheme}' in '{uri}'")]
    UnsupportedScheme { scheme: String, uri: String },

    /// The resolved path escapes the configured root directory
    #[error("path traversal detected: '{path}' is outside '{root}'")]
    PathTraversal { path: PathBuf, root: PathBuf },

    /// The document was found but could not be parsed
    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl FetchError {
    pub fn disabled<U: ToString>(uri: U) -> Self {
        Self::Disabled { uri: uri.to_string() }
    }

    pub fn not_found<U: ToString>(uri: U) -> Self {
        Self::NotFound { uri: uri.to_string() }
    }

    pub fn unsupported_scheme<S: Into<String>, U: ToString>(scheme: S, uri: U) -> Self {
        Self::UnsupportedScheme {
            scheme: scheme.into(),
            uri: uri.to_string(),
        }
    }

    pub fn path_traversal(path: PathBuf, root: PathBuf) -> Self {
        Self::PathTraversal { path, root }
    }

    /// Whether retrying later could succeed
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::Parse(ParseError::Io { .. }))
    }
}

/// Failures turning text into a document value
#[derive(Error, Debug)]
pub enum ParseError {
    /// File I/O errors
    #[error("failed to read file '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// JSON parsing errors
    #[error("failed to parse JSON from '{origin}': {source}")]
    Json {
        origin: String,
        source: serde_json::Error,
    },

    /// YAML parsing errors
    #[error("failed to parse YAML from '{origin}': {source}")]
    Yaml {
        origin: String,
        source: serde_yaml::Error,
    },

    /// Unsupported file format
    #[error("unsupported file format for '{path}'; expected .json, .yaml, or .yml")]
    UnsupportedFormat { path: PathBuf },
}

impl ParseError {
    /// Create an I/O error with path context
    pub fn io(path: PathBuf, source: std::io::Error) -> Self {
        Self::Io { path, source }
    }

    /// Create a JSON parsing error with origin context
    pub fn json<O: ToString>(origin: O, source: serde_json::Error) -> Self {
        Self::Json {
            origin: origin.to_string(),
            source,
        }
    }

    /// Create a YAML parsing error with origin context
    pub fn yaml<O: ToString>(origin: O, source: serde_yaml::Error) -> Self {
        Self::Yaml {
            origin: origin.to_string(),
            source,
        }
    }

    /// Create an unsupported format error
    pub fn unsupported_format(path: PathBuf) -> Self {
        Self::UnsupportedFormat { path }
    }

    /// Path associated with this error, if it came from a file
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::Io { path, .. } | Self::UnsupportedFormat { path } => Some(path),
            _ => None,
        }
    }

    /// Whether the underlying cause is a missing file
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::JsonPointer;

    fn location() -> SchemaLocation {
        SchemaLocation::new("mem://root", JsonPointer::root().child("items"))
    }

    #[test]
    fn test_type_mismatch_display() {
        let error = TypeMismatchError {
            keyword: "items".to_string(),
            location: location().to_string(),
            expected: vec![ValueKind::Object, ValueKind::Boolean, ValueKind::Array],
            actual: ValueKind::String,
        };
        assert_eq!(
            error.to_string(),
            "items at 'mem://root#/items': expected object or boolean or array, found string"
        );
    }

    #[test]
    fn test_location_accessor() {
        let error = LoadError::invalid_schema(&location(), "minItems must be non-negative");
        assert_eq!(error.location(), Some("mem://root#/items"));

        let error: LoadError =
            ReferenceResolutionError::fetch("mem://other", &location(), FetchError::not_found("mem://other"))
                .into();
        assert_eq!(error.location(), Some("mem://root#/items"));
        assert!(error.to_string().contains("document not found"));

        let error = LoadError::invalid_base_uri("relative", "missing scheme");
        assert_eq!(error.location(), None);
    }

    #[test]
    fn test_fetch_error_recoverability() {
        assert!(FetchError::not_found("x").is_recoverable());
        assert!(!FetchError::disabled("x").is_recoverable());
        let missing = ParseError::io(
            PathBuf::from("/nope"),
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(missing.is_not_found());
    }
}
