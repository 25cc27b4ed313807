//! Counter store implementations for the cache library.

pub mod memory;
pub mod metrics;
pub mod redis;

pub use memory::{EvictOnSetConfig, MemoryStore, MemoryStoreConfig};
pub use metrics::{CacheMetric, MetricsSink, MetricsStore};
pub use redis::{RedisStore, RedisStoreConfig};
