//! Shared utilities for the cache library.
//!
//! Storage layout: each cached computation occupies two slots in the counter
//! store, a data slot holding the serialized envelope and a lock slot holding
//! the regeneration counter.

use std::time::{SystemTime, UNIX_EPOCH};

/// Build the data-slot key for a namespace and key.
///
/// Format: `{namespace}::data:{key}`
pub fn data_key(namespace: &str, key: &str) -> String {
    format!("{}::data:{}", namespace, key)
}

/// Build the lock-slot key for a namespace and key.
///
/// Format: `{namespace}::lock:{key}`
pub fn lock_key(namespace: &str, key: &str) -> String {
    format!("{}::lock:{}", namespace, key)
}

/// Get the current time in milliseconds since UNIX epoch.
pub fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_millis() as i64
}

/// Simple pseudo-random number generator (0.0 to 1.0).
/// This avoids adding a dependency on rand crate.
pub fn rand_simple() -> f64 {
    use std::collections::hash_map::RandomState;
    use std::hash::{BuildHasher, Hasher};

    let state = RandomState::new();
    let mut hasher = state.build_hasher();
    hasher.write_u64(
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos() as u64,
    );
    (hasher.finish() as f64) / (u64::MAX as f64)
}
