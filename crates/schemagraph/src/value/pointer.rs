//! RFC 6901 JSON pointers
//!
//! Copyright (c) 2025 Schemagraph Authors
//! Licensed under the Apache-2.0 license

use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Errors raised while parsing or following a pointer
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PointerError {
    #[error("JSON pointer must start with '/' or be empty: '{0}'")]
    MissingLeadingSlash(String),

    #[error("invalid escape sequence in JSON pointer segment '{0}'")]
    InvalidEscape(String),

    #[error("property '{0}' not found")]
    MissingProperty(String),

    #[error("array index {index} out of bounds (length {len})")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("invalid array index '{0}'")]
    InvalidIndex(String),

    #[error("cannot access '{0}' on a scalar value")]
    ScalarTraversal(String),
}

/// A parsed JSON pointer, stored as unescaped reference tokens
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct JsonPointer {
    tokens: Vec<String>,
}

impl JsonPointer {
    /// The empty pointer, addressing the document root
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse the string form (`""`, `"/a/0"`, `"/a~1b"`)
    pub fn parse(pointer: &str) -> Result<Self, PointerError> {
        if pointer.is_empty() {
            return Ok(Self::root());
        }
        let rest = pointer
            .strip_prefix('/')
            .ok_or_else(|| PointerError::MissingLeadingSlash(pointer.to_string()))?;

        let tokens = rest
            .split('/')
            .map(unescape)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { tokens })
    }

    /// Pointer extended by one token
    pub fn child<T: ToString>(&self, token: T) -> Self {
        let mut tokens = self.tokens.clone();
        tokens.push(token.to_string());
        Self { tokens }
    }

    /// Pointer extended by every token of `other`
    pub fn join(&self, other: &JsonPointer) -> Self {
        let mut tokens = self.tokens.clone();
        tokens.extend(other.tokens.iter().cloned());
        Self { tokens }
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn is_root(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Follow the pointer through `document`
    pub fn resolve<'a>(&self, document: &'a Value) -> Result<&'a Value, PointerError> {
        let mut current = document;
        for token in &self.tokens {
            current = match current {
                Value::Object(entries) => entries
                    .get(token)
                    .ok_or_else(|| PointerError::MissingProperty(token.clone()))?,
                Value::Array(items) => {
                    let index = token
                        .parse::<usize>()
                        .map_err(|_| PointerError::InvalidIndex(token.clone()))?;
                    items.get(index).ok_or(PointerError::IndexOutOfBounds {
                        index,
                        len: items.len(),
                    })?
                }
                _ => return Err(PointerError::ScalarTraversal(token.clone())),
            };
        }
        Ok(current)
    }
}

fn unescape(segment: &str) -> Result<String, PointerError> {
    let mut out = String::with_capacity(segment.len());
    let mut chars = segment.chars();
    while let Some(ch) = chars.next() {
        if ch == '~' {
            match chars.next() {
                Some('0') => out.push('~'),
                Some('1') => out.push('/'),
                _ => return Err(PointerError::InvalidEscape(segment.to_string())),
            }
        } else {
            out.push(ch);
        }
    }
    Ok(out)
}

impl fmt::Display for JsonPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for token in &self.tokens {
            write!(f, "/{}", token.replace('~', "~0").replace('/', "~1"))?;
        }
        Ok(())
    }
}
