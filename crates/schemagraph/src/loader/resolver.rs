//! URI resolution and `$id` scoping for `$ref`
//!
//! Copyright (c) 2025 Schemagraph Authors
//! Licensed under the Apache-2.0 license

use crate::loader::fetcher::document_key;
use crate::value::JsonPointer;
use percent_encoding::percent_decode_str;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use url::Url;

/// Keywords whose values are instance data rather than subschemas
const DATA_KEYWORDS: &[&str] = &["enum", "const", "default", "examples"];

/// A document known to the current load, with the URI it was loaded from
#[derive(Debug, Clone)]
pub struct Document {
    pub value: Arc<Value>,
    pub base: Url,
}

impl Document {
    pub fn new(value: Value, base: Url) -> Self {
        Self {
            value: Arc::new(value),
            base,
        }
    }

    /// Canonical key of this document
    pub fn key(&self) -> String {
        document_key(self.base.as_str())
    }
}

/// Where a reference lands: a document and a pointer into it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub document: String,
    pub pointer: JsonPointer,
}

/// What the fragment of a resolved reference means
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    /// No fragment, or an empty one: the whole document
    Root,
    /// `#/a/b`
    Pointer(JsonPointer),
    /// `#name`, resolved through `$id`
    PlainName(String),
}

/// Resolve a `$ref` value against the current scope
pub fn resolve_reference(scope: &Url, reference: &str) -> Result<Url, url::ParseError> {
    scope.join(reference)
}

/// Split an absolute reference into its document key and decoded fragment
pub fn split_reference(uri: &Url) -> Result<(String, Fragment), String> {
    let document = document_key(uri.as_str());
    let fragment = match uri.fragment() {
        None | Some("") => Fragment::Root,
        Some(raw) => {
            let decoded = percent_decode_str(raw)
                .decode_utf8()
                .map_err(|e| format!("fragment is not valid UTF-8: {}", e))?;
            if decoded.starts_with('/') {
                let pointer = JsonPointer::parse(&decoded).map_err(|e| e.to_string())?;
                Fragment::Pointer(pointer)
            } else {
                Fragment::PlainName(decoded.into_owned())
            }
        }
    };
    Ok((document, fragment))
}

/// Identifier key of a URI: fragment kept unless it is empty
fn id_key(uri: &Url) -> String {
    if uri.fragment() == Some("") {
        let mut uri = uri.clone();
        uri.set_fragment(None);
        uri.to_string()
    } else {
        uri.to_string()
    }
}

/// Index of every `$id` seen in the documents of one load
#[derive(Debug, Default)]
pub struct IdIndex {
    entries: HashMap<String, Target>,
}

impl IdIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index the root of `document` and every `$id` inside it
    pub fn scan(&mut self, document: &Document) {
        let key = document.key();
        self.entries
            .entry(key.clone())
            .or_insert_with(|| Target {
                document: key.clone(),
                pointer: JsonPointer::root(),
            });
        self.scan_node(&key, &document.base, &document.value, &JsonPointer::root());
    }

    fn scan_node(&mut self, document: &str, scope: &Url, value: &Value, pointer: &JsonPointer) {
        match value {
            Value::Object(object) => {
                let scope = match object.get("$id").and_then(Value::as_str) {
                    Some(id) => match scope.join(id) {
                        Ok(resolved) => {
                            tracing::trace!(id = %resolved, %pointer, "indexed $id");
                            self.entries.entry(id_key(&resolved)).or_insert_with(|| Target {
                                document: document.to_string(),
                                pointer: pointer.clone(),
                            });
                            resolved
                        }
                        Err(error) => {
                            tracing::warn!(id, %error, "ignoring unparsable $id");
                            scope.clone()
                        }
                    },
                    None => scope.clone(),
                };
                for (key, child) in object {
                    if DATA_KEYWORDS.contains(&key.as_str()) {
                        continue;
                    }
                    self.scan_node(document, &scope, child, &pointer.child(key));
                }
            }
            Value::Array(items) => {
                for (index, child) in items.iter().enumerate() {
                    self.scan_node(document, scope, child, &pointer.child(index));
                }
            }
            _ => {}
        }
    }

    /// Target identified by `uri` (document root or embedded `$id`)
    pub fn lookup(&self, uri: &Url) -> Option<&Target> {
        self.entries.get(&id_key(uri))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Resolution scope enclosing the node at `pointer`: the document base with
/// the `$id` of every ancestor applied in order
///
/// The node's own `$id` is not applied; the loader applies it on entry.
pub fn enclosing_scope(document: &Document, pointer: &JsonPointer) -> Url {
    let mut scope = document.base.clone();
    let mut current: &Value = &document.value;
    for token in pointer.tokens() {
        apply_id(&mut scope, current);
        let next = match current {
            Value::Object(object) => object.get(token),
            Value::Array(items) => token.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        };
        match next {
            Some(value) => current = value,
            None => break,
        }
    }
    scope
}

/// Narrow `scope` by the `$id` of `value`, if it has a usable one
pub fn apply_id(scope: &mut Url, value: &Value) {
    if let Some(id) = value.get("$id").and_then(Value::as_str) {
        if let Ok(resolved) = scope.join(id) {
            *scope = resolved;
        }
    }
}
