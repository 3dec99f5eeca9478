//! Canonical-URI registry of schema slots
//!
//! Copyright (c) 2025 Schemagraph Authors
//! Licensed under the Apache-2.0 license

use crate::schema::SchemaId;
use crate::value::JsonPointer;
use std::collections::HashMap;

/// Canonical key of a schema location: `document-uri#pointer`
pub fn canonical_key(document: &str, pointer: &JsonPointer) -> String {
    format!("{}#{}", document, pointer)
}

/// Maps canonical keys to the slot holding (or about to hold) that schema
///
/// A key is registered as soon as its slot is reserved, before the body is
/// built, so a reference back to a schema under construction finds the slot
/// instead of loading it again.
#[derive(Debug, Default)]
pub struct ReferenceRegistry {
    slots: HashMap<String, SchemaId>,
}

impl ReferenceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&self, key: &str) -> Option<SchemaId> {
        self.slots.get(key).copied()
    }

    /// Register `key`; the first registration of a key wins
    pub fn register<K: Into<String>>(&mut self, key: K, id: SchemaId) -> SchemaId {
        *self.slots.entry(key.into()).or_insert(id)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Registered keys, sorted
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.slots.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_key() {
        let pointer = JsonPointer::parse("/definitions/a~1b").unwrap();
        assert_eq!(
            canonical_key("mem://root", &pointer),
            "mem://root#/definitions/a~1b"
        );
        assert_eq!(canonical_key("mem://root", &JsonPointer::root()), "mem://root#");
    }

    #[test]
    fn test_first_registration_wins() {
        let mut registry = ReferenceRegistry::new();
        let first = SchemaId::new(0);
        assert_eq!(registry.register("doc#", first), first);
        assert_eq!(registry.register("doc#", SchemaId::new(1)), first);
        assert_eq!(registry.lookup("doc#"), Some(first));
        assert_eq!(registry.lookup("doc#/x"), None);
        assert_eq!(registry.keys(), vec!["doc#"]);
    }
}
