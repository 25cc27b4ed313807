use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;

use crate::error::CacheError;

/// The stored representation of a cached value plus its timing metadata.
///
/// An envelope, once written, is immutable; regeneration produces a
/// brand-new envelope that replaces the old one with a single `set`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<V> {
    /// The cached value.
    pub value: V,

    /// Unix timestamp in milliseconds at which this value was produced.
    pub generated_at: i64,

    /// Duration in milliseconds after `generated_at` during which the value
    /// is considered fresh.
    pub soft_ttl_ms: i64,

    /// Duration in milliseconds after `generated_at` past which the value
    /// must no longer be served at all. Also the total store-level expiry.
    pub hard_ttl_ms: i64,
}

impl<V> Envelope<V> {
    /// Create a new envelope stamped at `generated_at`.
    pub fn new(value: V, generated_at: i64, soft_ttl_ms: i64, hard_ttl_ms: i64) -> Self {
        Envelope {
            value,
            generated_at,
            soft_ttl_ms,
            hard_ttl_ms,
        }
    }

    /// Age of the value at `now_ms`.
    pub fn age_ms(&self, now_ms: i64) -> i64 {
        now_ms - self.generated_at
    }

    /// Check if the value is still fresh. A value aged exactly `soft_ttl_ms`
    /// is still fresh.
    pub fn is_fresh(&self, now_ms: i64) -> bool {
        self.age_ms(now_ms) <= self.soft_ttl_ms
    }

    /// Check if the value may still be handed to callers at all. A value
    /// aged exactly `hard_ttl_ms` is still servable.
    pub fn is_servable(&self, now_ms: i64) -> bool {
        self.age_ms(now_ms) <= self.hard_ttl_ms
    }

    /// Check if the value is stale but still servable.
    pub fn is_stale(&self, now_ms: i64) -> bool {
        !self.is_fresh(now_ms) && self.is_servable(now_ms)
    }

    /// Check if the value is past its hard horizon and must be treated as
    /// absent.
    pub fn is_expired(&self, now_ms: i64) -> bool {
        self.age_ms(now_ms) > self.hard_ttl_ms
    }
}

impl<V> Envelope<V>
where
    V: Serialize + DeserializeOwned,
{
    /// Serialize the envelope into the store's payload slot.
    pub fn to_payload(&self) -> Result<String, CacheError> {
        serde_json::to_string(self)
            .map_err(|e| CacheError::Serialization(format!("envelope encode failed: {}", e)))
    }

    /// Deserialize an envelope out of the store's payload slot.
    pub fn from_payload(payload: &str) -> Result<Self, CacheError> {
        serde_json::from_str(payload)
            .map_err(|e| CacheError::Serialization(format!("envelope decode failed: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope_at(generated_at: i64) -> Envelope<String> {
        Envelope::new("v".to_string(), generated_at, 60_000, 300_000)
    }

    #[test]
    fn test_fresh_boundary_is_inclusive() {
        let env = envelope_at(1_000);
        // Exactly soft_ttl old: still fresh.
        assert!(env.is_fresh(1_000 + 60_000));
        assert!(!env.is_stale(1_000 + 60_000));
        // One past: stale.
        assert!(!env.is_fresh(1_000 + 60_001));
        assert!(env.is_stale(1_000 + 60_001));
    }

    #[test]
    fn test_hard_boundary_is_inclusive() {
        let env = envelope_at(1_000);
        // Exactly hard_ttl old: still servable stale.
        assert!(env.is_servable(1_000 + 300_000));
        assert!(env.is_stale(1_000 + 300_000));
        assert!(!env.is_expired(1_000 + 300_000));
        // One past: expired.
        assert!(!env.is_servable(1_000 + 300_001));
        assert!(env.is_expired(1_000 + 300_001));
    }

    #[test]
    fn test_payload_round_trip() {
        let env = envelope_at(42);
        let payload = env.to_payload().unwrap();
        let decoded: Envelope<String> = Envelope::from_payload(&payload).unwrap();
        assert_eq!(decoded.value, "v");
        assert_eq!(decoded.generated_at, 42);
        assert_eq!(decoded.soft_ttl_ms, 60_000);
        assert_eq!(decoded.hard_ttl_ms, 300_000);
    }

    #[test]
    fn test_from_payload_rejects_garbage() {
        let result: Result<Envelope<String>, _> = Envelope::from_payload("not json");
        assert!(matches!(result, Err(CacheError::Serialization(_))));
    }
}
