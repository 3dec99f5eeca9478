//! Retrieval of external schema documents
//!
//! The loader never performs I/O on its own; it asks a [`ReferenceFetcher`]
//! for every document that is not already known. The default
//! [`RejectingFetcher`] refuses everything, so external references must be
//! enabled explicitly.
//!
//! Copyright (c) 2025 Schemagraph Authors
//! Licensed under the Apache-2.0 license

use crate::loader::error::FetchError;
use crate::loader::parser::DocumentParser;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use url::Url;

/// Source of external documents, keyed by absolute URI without fragment
pub trait ReferenceFetcher: Send + Sync {
    fn fetch(&self, uri: &Url) -> Result<Value, FetchError>;
}

impl<F: ReferenceFetcher + ?Sized> ReferenceFetcher for Box<F> {
    fn fetch(&self, uri: &Url) -> Result<Value, FetchError> {
        (**self).fetch(uri)
    }
}

impl<F: ReferenceFetcher + ?Sized> ReferenceFetcher for std::sync::Arc<F> {
    fn fetch(&self, uri: &Url) -> Result<Value, FetchError> {
        (**self).fetch(uri)
    }
}

/// Refuses every request
#[derive(Debug, Default, Clone, Copy)]
pub struct RejectingFetcher;

impl ReferenceFetcher for RejectingFetcher {
    fn fetch(&self, uri: &Url) -> Result<Value, FetchError> {
        Err(FetchError::disabled(uri))
    }
}

/// Serves documents registered up front
#[derive(Debug, Default, Clone)]
pub struct InMemoryFetcher {
    documents: HashMap<String, Value>,
}

impl InMemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a document; any fragment in `uri` is ignored
    pub fn insert<U: AsRef<str>>(&mut self, uri: U, document: Value) {
        self.documents.insert(document_key(uri.as_ref()), document);
    }

    /// Builder-style [`InMemoryFetcher::insert`]
    pub fn with_document<U: AsRef<str>>(mut self, uri: U, document: Value) -> Self {
        self.insert(uri, document);
        self
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl ReferenceFetcher for InMemoryFetcher {
    fn fetch(&self, uri: &Url) -> Result<Value, FetchError> {
        self.documents
            .get(&document_key(uri.as_str()))
            .cloned()
            .ok_or_else(|| FetchError::not_found(uri))
    }
}

/// Reads `file://` documents from disk, JSON or YAML by extension
///
/// With a root directory configured, any path that resolves outside of it is
/// refused.
#[derive(Debug, Default, Clone)]
pub struct FileFetcher {
    root: Option<PathBuf>,
    parser: DocumentParser,
}

impl FileFetcher {
    /// Fetcher that may read any file
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetcher confined to `root` and its descendants
    pub fn confined_to<P: Into<PathBuf>>(root: P) -> Self {
        Self {
            root: Some(root.into()),
            parser: DocumentParser::new(),
        }
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    /// Whether `path` stays inside the configured root
    ///
    /// Both sides are canonicalized, so `..` segments and symlinks cannot be
    /// used to escape.
    pub fn is_safe_path(&self, path: &Path) -> Result<bool, FetchError> {
        let Some(root) = &self.root else {
            return Ok(true);
        };
        let canonical_root = root
            .canonicalize()
            .map_err(|_| FetchError::not_found(root.display()))?;
        let canonical_path = path
            .canonicalize()
            .map_err(|_| FetchError::not_found(path.display()))?;
        Ok(canonical_path.starts_with(&canonical_root))
    }
}

impl ReferenceFetcher for FileFetcher {
    fn fetch(&self, uri: &Url) -> Result<Value, FetchError> {
        if uri.scheme() != "file" {
            return Err(FetchError::unsupported_scheme(uri.scheme(), uri));
        }
        let path = uri
            .to_file_path()
            .map_err(|_| FetchError::not_found(uri))?;

        if !self.is_safe_path(&path)? {
            let root = self.root.clone().unwrap_or_default();
            tracing::warn!(path = %path.display(), root = %root.display(), "refusing path outside fetch root");
            return Err(FetchError::path_traversal(path, root));
        }

        self.parser.parse_file(&path).map_err(|error| {
            if error.is_not_found() {
                FetchError::not_found(uri)
            } else {
                FetchError::Parse(error)
            }
        })
    }
}

/// Normalized lookup key: the URI without its fragment
pub(crate) fn document_key(uri: &str) -> String {
    match Url::parse(uri) {
        Ok(mut url) => {
            url.set_fragment(None);
            url.to_string()
        }
        Err(_) => uri.split('#').next().unwrap_or(uri).to_string(),
    }
}
