use serde::{Serialize, de::DeserializeOwned};
use std::future::Future;
use std::sync::Arc;

use crate::dispatch::{Dispatcher, Job};
use crate::entry::Envelope;
use crate::error::CacheError;
use crate::lock::LockManager;
use crate::store::CounterStore;
use crate::utils::{data_key, lock_key, now_ms};

/// Error type produced by user generators.
pub type GeneratorError = Box<dyn std::error::Error + Send + Sync>;

/// Timing configuration for a cacheable computation.
#[derive(Debug, Clone, Copy)]
pub struct SwrConfig {
    /// Duration in milliseconds after generation during which a value is
    /// fresh.
    pub soft_ttl_ms: i64,
    /// Duration in milliseconds after generation past which a value must no
    /// longer be served. Also the total store-level expiry.
    pub hard_ttl_ms: i64,
    /// Expiry on the regeneration lock, independent of the value horizons.
    pub lock_timeout_ms: i64,
}

impl SwrConfig {
    fn validate(&self) -> Result<(), CacheError> {
        validate_horizons(self.soft_ttl_ms, self.hard_ttl_ms)?;
        if self.lock_timeout_ms <= 0 {
            return Err(CacheError::Config(format!(
                "lock_timeout_ms must be positive, got {}",
                self.lock_timeout_ms
            )));
        }
        Ok(())
    }
}

/// Per-call horizon override for `swr_with_options` and `set_with_options`.
pub struct TtlOptions {
    /// Time in milliseconds until the entry becomes stale.
    pub soft_ttl_ms: i64,
    /// Time in milliseconds until the entry may no longer be served.
    pub hard_ttl_ms: i64,
}

fn validate_horizons(soft_ttl_ms: i64, hard_ttl_ms: i64) -> Result<(), CacheError> {
    if soft_ttl_ms < 0 || hard_ttl_ms <= 0 {
        return Err(CacheError::Config(format!(
            "ttl durations out of range: soft={} hard={}",
            soft_ttl_ms, hard_ttl_ms
        )));
    }
    if soft_ttl_ms > hard_ttl_ms {
        return Err(CacheError::Config(format!(
            "soft_ttl_ms ({}) must not exceed hard_ttl_ms ({})",
            soft_ttl_ms, hard_ttl_ms
        )));
    }
    Ok(())
}

/// Classification of a stored envelope at read time.
enum ReadState<V> {
    /// Never computed, backend-expired, or past the hard horizon.
    Absent,
    Fresh(Envelope<V>),
    Stale(Envelope<V>),
}

/// The stale-while-revalidate engine.
///
/// For every read of a possibly-expired key the engine decides between three
/// outcomes: serve the cached value as-is, serve the stale value while
/// triggering exactly one out-of-band regeneration, or compute synchronously.
/// Mutual exclusion for "exactly one regeneration" spans independent
/// processes and rests solely on the counter store's atomic
/// increment/decrement; there is no in-process record of lock ownership, so
/// every acquisition check is a true store round-trip.
///
/// The synchronous path never blocks on another process's work. Concurrent
/// callers of a key that was never populated all compute independently — the
/// startup herd is an accepted limitation, not a bug.
pub struct SwrCache<V>
where
    V: Clone + Send + Sync,
{
    store: Arc<dyn CounterStore>,
    dispatcher: Arc<dyn Dispatcher>,
    locks: LockManager,
    config: SwrConfig,
    _marker: std::marker::PhantomData<fn() -> V>,
}

impl<V> Clone for SwrCache<V>
where
    V: Clone + Send + Sync,
{
    fn clone(&self) -> Self {
        SwrCache {
            store: Arc::clone(&self.store),
            dispatcher: Arc::clone(&self.dispatcher),
            locks: self.locks.clone(),
            config: self.config,
            _marker: std::marker::PhantomData,
        }
    }
}

impl<V> SwrCache<V>
where
    V: Clone + Send + Sync + Serialize + DeserializeOwned + 'static,
{
    /// Create a new SWR cache engine.
    ///
    /// Rejects configurations where `soft_ttl_ms` exceeds `hard_ttl_ms` or
    /// any duration is non-positive.
    pub fn new(
        store: Arc<dyn CounterStore>,
        dispatcher: Arc<dyn Dispatcher>,
        config: SwrConfig,
    ) -> Result<Self, CacheError> {
        config.validate()?;
        let locks = LockManager::new(Arc::clone(&store), config.lock_timeout_ms);
        Ok(SwrCache {
            store,
            dispatcher,
            locks,
            config,
            _marker: std::marker::PhantomData,
        })
    }

    /// Return the cached value without generating.
    ///
    /// The response is `None` for absent keys and for values past their hard
    /// horizon. Never triggers regeneration.
    pub async fn get(&self, namespace: &str, key: &str) -> Result<Option<V>, CacheError> {
        match self.read_state(namespace, key).await? {
            ReadState::Absent => Ok(None),
            ReadState::Fresh(envelope) | ReadState::Stale(envelope) => Ok(Some(envelope.value)),
        }
    }

    /// Get the cached value, or generate it, with stale-while-revalidate
    /// semantics:
    /// - a fresh value is returned unchanged, no side effects;
    /// - a stale value is returned immediately while at most one
    ///   regeneration job (across all processes) is submitted out of band;
    /// - an absent or hard-expired value is computed synchronously.
    ///
    /// The caller is never suspended beyond one store round-trip plus, on
    /// the absent path, one generator invocation.
    pub async fn swr<F, Fut>(
        &self,
        namespace: &str,
        key: &str,
        generator: F,
    ) -> Result<V, CacheError>
    where
        F: FnOnce(String) -> Fut + Send + 'static,
        Fut: Future<Output = Result<V, GeneratorError>> + Send + 'static,
    {
        let SwrConfig {
            soft_ttl_ms,
            hard_ttl_ms,
            ..
        } = self.config;
        self.swr_inner(namespace, key, generator, soft_ttl_ms, hard_ttl_ms)
            .await
    }

    /// Like [`swr`](Self::swr), with per-call horizons.
    pub async fn swr_with_options<F, Fut>(
        &self,
        namespace: &str,
        key: &str,
        generator: F,
        opts: TtlOptions,
    ) -> Result<V, CacheError>
    where
        F: FnOnce(String) -> Fut + Send + 'static,
        Fut: Future<Output = Result<V, GeneratorError>> + Send + 'static,
    {
        validate_horizons(opts.soft_ttl_ms, opts.hard_ttl_ms)?;
        self.swr_inner(namespace, key, generator, opts.soft_ttl_ms, opts.hard_ttl_ms)
            .await
    }

    async fn swr_inner<F, Fut>(
        &self,
        namespace: &str,
        key: &str,
        generator: F,
        soft_ttl_ms: i64,
        hard_ttl_ms: i64,
    ) -> Result<V, CacheError>
    where
        F: FnOnce(String) -> Fut + Send + 'static,
        Fut: Future<Output = Result<V, GeneratorError>> + Send + 'static,
    {
        match self.read_state(namespace, key).await? {
            ReadState::Absent => {
                // Startup herd: concurrent callers in this state all compute
                // independently, no locking.
                self.generate_and_store(namespace, key, generator, soft_ttl_ms, hard_ttl_ms)
                    .await
            }
            ReadState::Fresh(envelope) => Ok(envelope.value),
            ReadState::Stale(envelope) => {
                let lock_key = lock_key(namespace, key);
                match self.locks.try_acquire(&lock_key).await {
                    Ok(true) => {
                        self.dispatch_regeneration(
                            namespace, key, generator, soft_ttl_ms, hard_ttl_ms,
                        );
                    }
                    Ok(false) => {
                        // Someone else is already regenerating; no duplicate
                        // job.
                    }
                    Err(e) => {
                        // The stale value is still servable; regeneration can
                        // wait for a reader whose acquire goes through.
                        tracing::warn!(
                            "lock acquire failed, serving stale: key={}, error={}",
                            key,
                            e
                        );
                    }
                }
                Ok(envelope.value)
            }
        }
    }

    /// Store a value explicitly, stamping a brand-new envelope.
    pub async fn set(&self, namespace: &str, key: &str, value: V) -> Result<(), CacheError> {
        self.store_envelope(
            namespace,
            key,
            value,
            self.config.soft_ttl_ms,
            self.config.hard_ttl_ms,
        )
        .await
    }

    /// Like [`set`](Self::set), with per-call horizons.
    pub async fn set_with_options(
        &self,
        namespace: &str,
        key: &str,
        value: V,
        opts: TtlOptions,
    ) -> Result<(), CacheError> {
        validate_horizons(opts.soft_ttl_ms, opts.hard_ttl_ms)?;
        self.store_envelope(namespace, key, value, opts.soft_ttl_ms, opts.hard_ttl_ms)
            .await
    }

    /// Unconditionally delete both the stored envelope and the lock counter
    /// for `key`. Idempotent.
    pub async fn invalidate(&self, namespace: &str, key: &str) -> Result<(), CacheError> {
        let data_key = data_key(namespace, key);
        let lock_key = lock_key(namespace, key);
        futures::future::try_join(self.store.delete(&data_key), self.store.delete(&lock_key))
            .await?;
        Ok(())
    }

    /// Read and classify the stored envelope for `key`.
    async fn read_state(&self, namespace: &str, key: &str) -> Result<ReadState<V>, CacheError> {
        let payload = self.store.get(&data_key(namespace, key)).await?;

        let Some(payload) = payload else {
            return Ok(ReadState::Absent);
        };

        let envelope = match Envelope::<V>::from_payload(&payload) {
            Ok(envelope) => envelope,
            Err(e) => {
                // An undecodable envelope reads as absent so the next caller
                // regenerates it.
                tracing::warn!("discarding undecodable envelope: key={}, error={}", key, e);
                return Ok(ReadState::Absent);
            }
        };

        let now = now_ms();
        if envelope.is_fresh(now) {
            Ok(ReadState::Fresh(envelope))
        } else if envelope.is_servable(now) {
            Ok(ReadState::Stale(envelope))
        } else {
            // Past the hard horizon: must not be served, treated as never
            // computed.
            Ok(ReadState::Absent)
        }
    }

    /// Synchronous compute-and-store path (absent key).
    async fn generate_and_store<F, Fut>(
        &self,
        namespace: &str,
        key: &str,
        generator: F,
        soft_ttl_ms: i64,
        hard_ttl_ms: i64,
    ) -> Result<V, CacheError>
    where
        F: FnOnce(String) -> Fut + Send + 'static,
        Fut: Future<Output = Result<V, GeneratorError>> + Send + 'static,
    {
        let value = generator(key.to_string())
            .await
            .map_err(|e| CacheError::generator(key, e.to_string()))?;

        // The freshly computed value is correct regardless of whether the
        // write lands; a failed write only costs the next caller a
        // recomputation.
        if let Err(e) = self
            .store_envelope(namespace, key, value.clone(), soft_ttl_ms, hard_ttl_ms)
            .await
        {
            tracing::warn!("failed to store generated value: key={}, error={}", key, e);
        }

        Ok(value)
    }

    /// Build a new envelope stamped now and replace the data slot with a
    /// single `set`, expiring at the hard horizon.
    async fn store_envelope(
        &self,
        namespace: &str,
        key: &str,
        value: V,
        soft_ttl_ms: i64,
        hard_ttl_ms: i64,
    ) -> Result<(), CacheError> {
        let envelope = Envelope::new(value, now_ms(), soft_ttl_ms, hard_ttl_ms);
        let payload = envelope.to_payload()?;
        self.store
            .set(&data_key(namespace, key), payload, hard_ttl_ms)
            .await
    }

    /// Submit the regeneration job for a stale key whose lock this process
    /// just acquired.
    fn dispatch_regeneration<F, Fut>(
        &self,
        namespace: &str,
        key: &str,
        generator: F,
        soft_ttl_ms: i64,
        hard_ttl_ms: i64,
    ) where
        F: FnOnce(String) -> Fut + Send + 'static,
        Fut: Future<Output = Result<V, GeneratorError>> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        let locks = self.locks.clone();
        let data_key = data_key(namespace, key);
        let lock_key = lock_key(namespace, key);
        let key = key.to_string();

        let job: Job = Box::pin(async move {
            match generator(key.clone()).await {
                Ok(value) => {
                    let envelope = Envelope::new(value, now_ms(), soft_ttl_ms, hard_ttl_ms);
                    match envelope.to_payload() {
                        Ok(payload) => {
                            match store.set(&data_key, payload, hard_ttl_ms).await {
                                Ok(()) => tracing::debug!("regenerated: key={}", key),
                                Err(e) => tracing::warn!(
                                    "regeneration write failed: key={}, error={}",
                                    key,
                                    e
                                ),
                            }
                        }
                        Err(e) => {
                            tracing::warn!("regeneration encode failed: key={}, error={}", key, e)
                        }
                    }
                }
                Err(e) => {
                    // The stale value stays servable; the error never reaches
                    // the reader that triggered this job.
                    tracing::warn!(
                        "generator failed during regeneration: key={}, error={}",
                        key,
                        e
                    );
                }
            }

            // Released on every path so the next stale read can retry
            // regeneration instead of waiting out the lock timeout.
            locks.release(&lock_key).await;
        });

        self.dispatcher.dispatch(job);
    }
}
