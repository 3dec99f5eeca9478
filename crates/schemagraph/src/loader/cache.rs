//! Caching layer for fetched documents
//!
//! Copyright (c) 2025 Schemagraph Authors
//! Licensed under the Apache-2.0 license

use crate::loader::error::FetchError;
use crate::loader::fetcher::{document_key, ReferenceFetcher};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use url::Url;

/// Cache entry containing a fetched document and its fetch time
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The cached document
    pub content: Value,
    /// When this entry was cached
    pub cached_at: Instant,
}

impl CacheEntry {
    pub fn new(content: Value) -> Self {
        Self {
            content,
            cached_at: Instant::now(),
        }
    }

    /// Check if this cache entry is still fresh
    pub fn is_valid(&self, max_age: Option<Duration>) -> bool {
        match max_age {
            Some(max_age) => self.cached_at.elapsed() <= max_age,
            None => true,
        }
    }

    pub fn age(&self) -> Duration {
        self.cached_at.elapsed()
    }
}

/// Configuration for cache behavior
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Maximum cache size (number of documents)
    pub max_entries: usize,
    /// Maximum age for cache entries
    pub max_age: Option<Duration>,
    /// Whether to enable cache
    pub enabled: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 256,
            max_age: Some(Duration::from_secs(3600)), // 1 hour
            enabled: true,
        }
    }
}

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<String, CacheEntry>,
    access_order: Vec<String>, // For LRU eviction
    hits: u64,
    misses: u64,
}

impl CacheState {
    fn touch(&mut self, key: &str) {
        self.access_order.retain(|k| k != key);
        self.access_order.push(key.to_string());
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
        self.access_order.retain(|k| k != key);
    }

    fn evict_lru(&mut self) {
        if let Some(oldest) = self.access_order.first().cloned() {
            tracing::debug!(uri = %oldest, "evicting cached document");
            self.remove(&oldest);
        }
    }
}

/// Wraps another fetcher and memoizes its documents
///
/// Entries are evicted least-recently-used once `max_entries` is reached and
/// refetched once older than `max_age`. Failures are never cached.
#[derive(Debug)]
pub struct CachingFetcher<F> {
    inner: F,
    config: CacheConfig,
    state: Mutex<CacheState>,
}

impl<F: ReferenceFetcher> CachingFetcher<F> {
    /// Create a caching fetcher with default configuration
    pub fn new(inner: F) -> Self {
        Self::with_config(inner, CacheConfig::default())
    }

    /// Create a caching fetcher with custom configuration
    pub fn with_config(inner: F, config: CacheConfig) -> Self {
        Self {
            inner,
            config,
            state: Mutex::new(CacheState::default()),
        }
    }

    pub fn inner(&self) -> &F {
        &self.inner
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Whether a fresh entry exists for `uri`
    pub fn contains(&self, uri: &Url) -> bool {
        let state = self.lock();
        state
            .entries
            .get(&document_key(uri.as_str()))
            .is_some_and(|entry| entry.is_valid(self.config.max_age))
    }

    /// Remove a specific entry from cache
    pub fn invalidate(&self, uri: &Url) -> bool {
        let key = document_key(uri.as_str());
        let mut state = self.lock();
        let present = state.entries.contains_key(&key);
        state.remove(&key);
        present
    }

    /// Clear all cache entries
    pub fn clear(&self) {
        let mut state = self.lock();
        state.entries.clear();
        state.access_order.clear();
    }

    /// Remove expired entries, returning how many were dropped
    pub fn cleanup_expired(&self) -> usize {
        let mut state = self.lock();
        let expired: Vec<String> = state
            .entries
            .iter()
            .filter(|(_, entry)| !entry.is_valid(self.config.max_age))
            .map(|(key, _)| key.clone())
            .collect();
        for key in &expired {
            state.remove(key);
        }
        expired.len()
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        let state = self.lock();
        let total_entries = state.entries.len();
        let average_age = if total_entries > 0 {
            let total: Duration = state.entries.values().map(CacheEntry::age).sum();
            Some(total / total_entries as u32)
        } else {
            None
        };

        CacheStats {
            total_entries,
            max_entries: self.config.max_entries,
            average_age,
            hits: state.hits,
            misses: state.misses,
            enabled: self.config.enabled,
        }
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<F: ReferenceFetcher> ReferenceFetcher for CachingFetcher<F> {
    fn fetch(&self, uri: &Url) -> Result<Value, FetchError> {
        if !self.config.enabled || self.config.max_entries == 0 {
            return self.inner.fetch(uri);
        }

        let key = document_key(uri.as_str());
        {
            let mut state = self.lock();
            let cached = state
                .entries
                .get(&key)
                .filter(|entry| entry.is_valid(self.config.max_age))
                .map(|entry| entry.content.clone());
            match cached {
                Some(content) => {
                    state.hits += 1;
                    state.touch(&key);
                    tracing::debug!(uri = %key, "document cache hit");
                    return Ok(content);
                }
                None => {
                    state.misses += 1;
                    state.remove(&key);
                }
            }
        }

        // Fetch outside the lock so slow sources do not serialize other loads
        let content = self.inner.fetch(uri)?;

        let mut state = self.lock();
        if !state.entries.contains_key(&key) && state.entries.len() >= self.config.max_entries {
            state.evict_lru();
        }
        state.entries.insert(key.clone(), CacheEntry::new(content.clone()));
        state.touch(&key);
        Ok(content)
    }
}

/// Cache statistics for monitoring and debugging
#[derive(Debug, Clone)]
pub struct CacheStats {
    pub total_entries: usize,
    pub max_entries: usize,
    pub average_age: Option<Duration>,
    pub hits: u64,
    pub misses: u64,
    pub enabled: bool,
}

impl CacheStats {
    /// Calculate cache utilization as a percentage
    pub fn utilization(&self) -> f64 {
        if self.max_entries == 0 {
            0.0
        } else {
            (self.total_entries as f64 / self.max_entries as f64) * 100.0
        }
    }

    /// Share of lookups served from cache
    pub fn hit_rate(&self) -> f64 {
        let lookups = self.hits + self.misses;
        if lookups == 0 {
            0.0
        } else {
            self.hits as f64 / lookups as f64
        }
    }
}
