//! Builder API for registering multiple named caches.
//!
//! This module provides a convenient way to configure several cacheable
//! computations up front and look them up by name afterwards, the way an
//! application wires its caches once at startup.

use crate::cache::Cache;

/// Builder for a registry of named caches.
///
/// # Example
///
/// ```ignore
/// use herd_cache::{Cache, CacheBuilder, MemoryStore, MemoryStoreConfig};
/// use std::sync::Arc;
///
/// let store = Arc::new(MemoryStore::new(MemoryStoreConfig::default()));
///
/// let accounts = Cache::new("account", store.clone(), dispatcher.clone(), config)?;
/// let users = Cache::new("user", store, dispatcher, config)?;
///
/// let registry = CacheBuilder::new()
///     .add("account", accounts)
///     .add("user", users)
///     .build();
///
/// let account = registry.cache("account");
/// let data = account.get("chronark").await?;
/// ```
pub struct CacheBuilder<V>
where
    V: Clone + Send + Sync + 'static,
{
    caches: Vec<(String, Cache<V>)>,
}

impl<V> CacheBuilder<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Create a new CacheBuilder.
    pub fn new() -> Self {
        CacheBuilder { caches: Vec::new() }
    }

    /// Add a named cache to the registry.
    pub fn add(mut self, name: &str, cache: Cache<V>) -> Self {
        self.caches.push((name.to_string(), cache));
        self
    }

    /// Build the registry.
    pub fn build(self) -> CacheRegistry<V> {
        CacheRegistry {
            caches: self.caches,
        }
    }
}

impl<V> Default for CacheBuilder<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

/// A registry of named caches.
pub struct CacheRegistry<V>
where
    V: Clone + Send + Sync + 'static,
{
    caches: Vec<(String, Cache<V>)>,
}

impl<V> CacheRegistry<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Get a cache by name.
    ///
    /// Returns `None` if no cache was registered under the name.
    pub fn get(&self, name: &str) -> Option<&Cache<V>> {
        self.caches
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, cache)| cache)
    }

    /// Get a cache by name, panicking if it doesn't exist.
    ///
    /// This is useful when you know the cache exists and want cleaner code.
    pub fn cache(&self, name: &str) -> &Cache<V> {
        self.get(name)
            .unwrap_or_else(|| panic!("Cache '{}' not found", name))
    }
}
