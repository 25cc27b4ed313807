use serde::{Serialize, de::DeserializeOwned};
use std::future::Future;
use std::sync::Arc;

use crate::dispatch::Dispatcher;
use crate::error::CacheError;
use crate::store::CounterStore;
use crate::swr::{GeneratorError, SwrCache, SwrConfig, TtlOptions};

/// A cacheable computation bound to a namespace.
///
/// This is the per-computation handle an application holds: one `Cache<V>`
/// per kind of expensive value, all sharing the same counter store and
/// dispatcher. Namespaces isolate keys; the timing configuration
/// (`soft_ttl_ms`, `hard_ttl_ms`, `lock_timeout_ms`) is supplied per cache.
#[derive(Clone)]
pub struct Cache<V>
where
    V: Clone + Send + Sync,
{
    namespace: String,
    engine: SwrCache<V>,
}

impl<V> Cache<V>
where
    V: Clone + Send + Sync + Serialize + DeserializeOwned + 'static,
{
    /// Create a new Cache over the given store and dispatcher.
    ///
    /// Rejects configurations where `soft_ttl_ms` exceeds `hard_ttl_ms` or
    /// any duration is non-positive.
    ///
    /// # Example
    /// ```ignore
    /// let store = Arc::new(MemoryStore::new(MemoryStoreConfig::default()));
    /// let cache: Cache<User> = Cache::new(
    ///     "users",
    ///     store,
    ///     Arc::new(TokioDispatcher),
    ///     SwrConfig {
    ///         soft_ttl_ms: 60_000,
    ///         hard_ttl_ms: 300_000,
    ///         lock_timeout_ms: 30_000,
    ///     },
    /// )?;
    /// ```
    pub fn new(
        namespace: &str,
        store: Arc<dyn CounterStore>,
        dispatcher: Arc<dyn Dispatcher>,
        config: SwrConfig,
    ) -> Result<Self, CacheError> {
        let engine = SwrCache::new(store, dispatcher, config)?;
        Ok(Cache {
            namespace: namespace.to_string(),
            engine,
        })
    }

    /// Return the cached value without generating.
    ///
    /// Returns `None` for absent keys and values past their hard horizon.
    pub async fn get(&self, key: &str) -> Result<Option<V>, CacheError> {
        self.engine.get(&self.namespace, key).await
    }

    /// Get the cached value, or generate it, with stale-while-revalidate
    /// semantics. See [`SwrCache::swr`].
    ///
    /// # Example
    /// ```ignore
    /// let user = cache.swr("user:123", |key| async move {
    ///     db.get_user(&key).await
    /// }).await?;
    /// ```
    pub async fn swr<F, Fut>(&self, key: &str, generator: F) -> Result<V, CacheError>
    where
        F: FnOnce(String) -> Fut + Send + 'static,
        Fut: Future<Output = Result<V, GeneratorError>> + Send + 'static,
    {
        self.engine.swr(&self.namespace, key, generator).await
    }

    /// Like [`swr`](Self::swr), with per-call horizons.
    pub async fn swr_with_options<F, Fut>(
        &self,
        key: &str,
        generator: F,
        opts: TtlOptions,
    ) -> Result<V, CacheError>
    where
        F: FnOnce(String) -> Fut + Send + 'static,
        Fut: Future<Output = Result<V, GeneratorError>> + Send + 'static,
    {
        self.engine
            .swr_with_options(&self.namespace, key, generator, opts)
            .await
    }

    /// Store a value explicitly, stamping a brand-new envelope.
    pub async fn set(&self, key: &str, value: V) -> Result<(), CacheError> {
        self.engine.set(&self.namespace, key, value).await
    }

    /// Like [`set`](Self::set), with per-call horizons.
    pub async fn set_with_options(
        &self,
        key: &str,
        value: V,
        opts: TtlOptions,
    ) -> Result<(), CacheError> {
        self.engine
            .set_with_options(&self.namespace, key, value, opts)
            .await
    }

    /// Unconditionally delete both the stored value and the regeneration
    /// lock for `key`. Idempotent.
    pub async fn invalidate(&self, key: &str) -> Result<(), CacheError> {
        self.engine.invalidate(&self.namespace, key).await
    }
}
