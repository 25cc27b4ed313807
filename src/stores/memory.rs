use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::error::CacheError;
use crate::store::CounterStore;
use crate::utils::{now_ms, rand_simple};

/// Configuration for eviction on set operations.
#[derive(Debug, Clone)]
pub struct EvictOnSetConfig {
    /// Provide a number between 0 and 1 to calculate whether eviction should run on each set.
    ///
    /// - `1.0` -> run eviction on every `set`
    /// - `0.5` -> run eviction on every 2nd `set` (on average)
    /// - `0.0` -> disable eviction
    pub frequency: f64,

    /// Remove items until the number of items in the map is lower than `max_items`.
    pub max_items: usize,
}

/// Configuration for MemoryStore.
#[derive(Debug, Clone, Default)]
pub struct MemoryStoreConfig {
    /// Remove expired entries on every `set` operation.
    pub evict_on_set: Option<EvictOnSetConfig>,
}

/// A slot holds either a serialized envelope or a lock counter.
#[derive(Clone)]
enum Slot {
    Payload(String),
    Counter(i64),
}

#[derive(Clone)]
struct Stored {
    expires: i64,
    slot: Slot,
}

/// Thread-safe in-process counter store using HashMap with RwLock.
///
/// Counter atomicity holds within a single process: `incr`/`decr` run their
/// read-modify-write under the map's write lock. That makes this store the
/// test double for the protocol and a single-process deployment option; for
/// mutual exclusion across independent processes use `RedisStore`.
pub struct MemoryStore {
    state: RwLock<HashMap<String, Stored>>,
    evict_on_set: Option<EvictOnSetConfig>,
}

impl MemoryStore {
    /// Create a new MemoryStore with the given configuration.
    pub fn new(config: MemoryStoreConfig) -> Self {
        MemoryStore {
            state: RwLock::new(HashMap::new()),
            evict_on_set: config.evict_on_set,
        }
    }

    /// Run eviction if configured and random check passes.
    async fn maybe_evict(&self) {
        let Some(ref config) = self.evict_on_set else {
            return;
        };

        // Check frequency
        if config.frequency <= 0.0 {
            return;
        }

        let should_evict = if config.frequency >= 1.0 {
            true
        } else {
            rand_simple() < config.frequency
        };

        if !should_evict {
            return;
        }

        let mut state = self.state.write().await;
        let now = now_ms();

        // First delete all expired entries
        state.retain(|_, v| v.expires > now);

        // If still over max_items, remove oldest entries
        if state.len() > config.max_items {
            // Collect keys to remove (oldest first based on expiry)
            let mut entries: Vec<_> = state.iter().map(|(k, v)| (k.clone(), v.expires)).collect();
            entries.sort_by_key(|(_, expires)| *expires);

            let to_remove = state.len() - config.max_items;
            for (key, _) in entries.into_iter().take(to_remove) {
                state.remove(&key);
            }
        }
    }
}

#[async_trait]
impl CounterStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let state = self.state.read().await;

        let Some(stored) = state.get(key) else {
            return Ok(None);
        };

        let now = now_ms();
        if stored.expires <= now {
            // Entry is expired, remove it
            drop(state);
            let mut state = self.state.write().await;
            state.remove(key);
            return Ok(None);
        }

        // Counters read back as their decimal representation, matching how
        // a string-typed backend exposes them.
        let payload = match &stored.slot {
            Slot::Payload(payload) => payload.clone(),
            Slot::Counter(count) => count.to_string(),
        };
        Ok(Some(payload))
    }

    async fn set(&self, key: &str, payload: String, ttl_ms: i64) -> Result<(), CacheError> {
        {
            let mut state = self.state.write().await;
            state.insert(
                key.to_string(),
                Stored {
                    expires: now_ms() + ttl_ms,
                    slot: Slot::Payload(payload),
                },
            );
        }

        self.maybe_evict().await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut state = self.state.write().await;
        state.remove(key);
        Ok(())
    }

    async fn incr(&self, key: &str, delta: i64, ttl_ms: i64) -> Result<i64, CacheError> {
        let mut state = self.state.write().await;
        let now = now_ms();

        let current = match state.get(key) {
            Some(stored) if stored.expires > now => match stored.slot {
                Slot::Counter(count) => Some(count),
                Slot::Payload(_) => {
                    return Err(CacheError::unavailable(
                        self.name(),
                        key,
                        "slot holds a payload, not a counter",
                    ));
                }
            },
            _ => None,
        };

        let previous = current.unwrap_or(0);
        let next = previous + delta;
        // A counter coming up from zero/absent gets a fresh expiry; an
        // already-held counter keeps its existing one.
        let expires = if previous <= 0 {
            now + ttl_ms
        } else {
            state.get(key).map(|s| s.expires).unwrap_or(now + ttl_ms)
        };

        state.insert(
            key.to_string(),
            Stored {
                expires,
                slot: Slot::Counter(next),
            },
        );
        Ok(next)
    }

    async fn decr(&self, key: &str, delta: i64) -> Result<i64, CacheError> {
        let mut state = self.state.write().await;
        let now = now_ms();

        match state.get_mut(key) {
            Some(stored) if stored.expires > now => match stored.slot {
                Slot::Counter(count) => {
                    let next = count - delta;
                    stored.slot = Slot::Counter(next);
                    Ok(next)
                }
                Slot::Payload(_) => Err(CacheError::unavailable(
                    self.name(),
                    key,
                    "slot holds a payload, not a counter",
                )),
            },
            // Nothing to decrement: report the would-be value without
            // materializing a slot.
            _ => Ok(-delta),
        }
    }
}
