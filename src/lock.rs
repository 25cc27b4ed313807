use std::sync::Arc;

use crate::error::CacheError;
use crate::store::CounterStore;

/// Distributed mutual exclusion for "is a regeneration of this key already
/// running", built only on the counter store's atomic increment/decrement.
///
/// Increment-then-check is the only operation atomic at the backend, which
/// makes "first increment to reach 1 wins" a correct single-owner lock
/// without compare-and-swap, at the cost of a compensating decrement on every
/// failed attempt. There is no holder token beyond the counter value: this is
/// a binary semaphore, not a reentrant or fair lock.
///
/// The lock counter carries its own expiry (`timeout_ms`), independent of any
/// cached value's horizons, so a crashed worker cannot wedge a key forever.
#[derive(Clone)]
pub struct LockManager {
    store: Arc<dyn CounterStore>,
    timeout_ms: i64,
}

impl LockManager {
    /// Create a new lock manager over `store` with the given lock timeout.
    pub fn new(store: Arc<dyn CounterStore>, timeout_ms: i64) -> Self {
        LockManager { store, timeout_ms }
    }

    /// Try to acquire the lock at `lock_key`.
    ///
    /// Returns `Ok(true)` when this caller now owns the lock and is solely
    /// responsible for releasing it. Returns `Ok(false)` when another process
    /// already holds it; losing the race is the expected outcome, not an
    /// error. The winning increment also (re)sets the lock's expiry to the
    /// configured timeout.
    pub async fn try_acquire(&self, lock_key: &str) -> Result<bool, CacheError> {
        let count = self.store.incr(lock_key, 1, self.timeout_ms).await?;
        if count == 1 {
            return Ok(true);
        }

        // Lost the race: undo our increment. Best effort — if the undo
        // fails the counter self-heals at the lock timeout.
        if let Err(e) = self.store.decr(lock_key, 1).await {
            tracing::warn!(
                "failed to undo lock increment: key={}, error={}",
                lock_key,
                e
            );
        }
        Ok(false)
    }

    /// Release the lock at `lock_key`.
    ///
    /// A result of `0` or below means the lock is now free. Decrementing
    /// below zero is tolerated and treated as "free"; duplicate releases
    /// never raise.
    pub async fn release(&self, lock_key: &str) {
        match self.store.decr(lock_key, 1).await {
            Ok(count) if count < 0 => {
                // A negative counter would keep every later increment from
                // reaching 1, so clear the slot entirely.
                if let Err(e) = self.store.delete(lock_key).await {
                    tracing::warn!(
                        "failed to clear negative lock counter: key={}, error={}",
                        lock_key,
                        e
                    );
                }
            }
            Ok(_) => {}
            Err(e) => {
                // The lock self-heals at its timeout.
                tracing::warn!("failed to release lock: key={}, error={}", lock_key, e);
            }
        }
    }
}
