use async_trait::async_trait;

use crate::error::CacheError;

/// A counter store is the narrow contract over the remote key/value backend.
///
/// Besides plain payload slots (`get`/`set`/`delete`) the backend must
/// provide atomic increment and decrement. Atomicity of the read-modify-write
/// is a prerequisite inherited from the backend (redis-family `INCRBY` and
/// `DECRBY` satisfy it) regardless of caller concurrency or process boundary;
/// backends lacking atomic increment are unsupported.
///
/// Counters on absent keys behave as if the key started at `0`, atomically.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// A name for diagnostics/tracing.
    ///
    /// # Example
    /// - "memory"
    /// - "redis"
    fn name(&self) -> &'static str;

    /// Return the payload stored at `key`.
    ///
    /// The response must be `None` for absent keys, including keys the
    /// backend already expired on its own.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Store `payload` at `key`, expiring it `ttl_ms` from now.
    ///
    /// A single `set` replaces the slot atomically at single-key
    /// granularity: readers observe either the old or the new payload in
    /// full, never a partial write.
    async fn set(&self, key: &str, payload: String, ttl_ms: i64) -> Result<(), CacheError>;

    /// Remove `key` from the store. Removing an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<(), CacheError>;

    /// Atomically increment the counter at `key` by `delta` and return the
    /// resulting value. An absent key counts up from `0`.
    ///
    /// When the increment raises the counter up from zero/absent, the key's
    /// expiry is (re)set to `ttl_ms`. The expiry write is not required to be
    /// atomic with the increment itself.
    async fn incr(&self, key: &str, delta: i64, ttl_ms: i64) -> Result<i64, CacheError>;

    /// Atomically decrement the counter at `key` by `delta` and return the
    /// resulting value, which may be negative.
    async fn decr(&self, key: &str, delta: i64) -> Result<i64, CacheError>;
}
