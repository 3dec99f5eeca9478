//! Named string formats for the `format` keyword
//!
//! Copyright (c) 2025 Schemagraph Authors
//! Licensed under the Apache-2.0 license

use std::collections::HashMap;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::sync::Arc;
use url::Url;

/// Predicate for a named string format
pub trait FormatValidator: Send + Sync {
    fn is_valid(&self, value: &str) -> bool;
}

impl<F> FormatValidator for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn is_valid(&self, value: &str) -> bool {
        self(value)
    }
}

/// Format names mapped to their predicates
///
/// Unknown format names are not an error: the loader logs a warning and the
/// keyword is not enforced.
#[derive(Clone)]
pub struct FormatRegistry {
    formats: HashMap<String, Arc<dyn FormatValidator>>,
}

impl FormatRegistry {
    /// Registry without any formats
    pub fn empty() -> Self {
        Self {
            formats: HashMap::new(),
        }
    }

    /// Register (or replace) a format
    pub fn register<N, V>(&mut self, name: N, validator: V) -> &mut Self
    where
        N: Into<String>,
        V: FormatValidator + 'static,
    {
        self.formats.insert(name.into(), Arc::new(validator));
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn FormatValidator>> {
        self.formats.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.formats.contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.formats.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for FormatRegistry {
    /// Registry with the built-in formats
    fn default() -> Self {
        let mut registry = Self::empty();
        registry
            .register("ipv4", |s: &str| s.parse::<Ipv4Addr>().is_ok())
            .register("ipv6", |s: &str| s.parse::<Ipv6Addr>().is_ok())
            .register("uri", |s: &str| Url::parse(s).is_ok())
            .register("regex", |s: &str| regex::Regex::new(s).is_ok())
            .register("email", is_email)
            .register("hostname", is_hostname);
        registry
    }
}

impl std::fmt::Debug for FormatRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormatRegistry")
            .field("formats", &self.names())
            .finish()
    }
}

fn is_email(value: &str) -> bool {
    match value.rsplit_once('@') {
        Some((local, domain)) => !local.is_empty() && is_hostname(domain),
        None => false,
    }
}

fn is_hostname(value: &str) -> bool {
    let value = value.strip_suffix('.').unwrap_or(value);
    !value.is_empty()
        && value.len() <= 253
        && value.split('.').all(|label| {
            !label.is_empty()
                && label.len() <= 63
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_formats() {
        let registry = FormatRegistry::default();
        let ipv4 = registry.get("ipv4").unwrap();
        assert!(ipv4.is_valid("192.168.0.1"));
        assert!(!ipv4.is_valid("256.0.0.1"));

        let ipv6 = registry.get("ipv6").unwrap();
        assert!(ipv6.is_valid("::1"));
        assert!(!ipv6.is_valid("12345::"));

        assert!(registry.get("uri").unwrap().is_valid("https://example.com/a?b"));
        assert!(!registry.get("uri").unwrap().is_valid("not a uri"));
        assert!(!registry.get("regex").unwrap().is_valid("(unclosed"));
        assert!(registry.get("email").unwrap().is_valid("a.b@example.com"));
        assert!(!registry.get("hostname").unwrap().is_valid("-bad.example"));
    }

    #[test]
    fn test_custom_format() {
        let mut registry = FormatRegistry::empty();
        registry.register("even-length", |s: &str| s.len() % 2 == 0);
        assert_eq!(registry.names(), vec!["even-length"]);
        assert!(registry.get("even-length").unwrap().is_valid("ab"));
        assert!(!registry.contains("ipv4"));
    }
}
