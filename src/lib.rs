//! herd-cache - A stale-while-revalidate cache with distributed regeneration locking
//!
//! This library provides a caching protocol for expensive computations:
//! - Stale-while-revalidate (SWR) semantics with separate soft and hard horizons
//! - At most one in-flight regeneration per key, across independent processes
//! - Mutual exclusion built only on the backend's atomic increment/decrement
//! - Fire-and-forget regeneration through a pluggable dispatcher
//!
//! A stale value is served immediately while a single background job
//! recomputes it, so many concurrent readers never all pay the recomputation
//! cost at once. The one unmitigated case is the startup herd: concurrent
//! readers of a key that was never populated all compute synchronously.
//!
//! # Example
//!
//! ```ignore
//! use herd_cache::{Cache, MemoryStore, MemoryStoreConfig, SwrConfig, TokioDispatcher};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = Arc::new(MemoryStore::new(MemoryStoreConfig::default()));
//!
//!     let users: Cache<String> = Cache::new(
//!         "users",
//!         store,
//!         Arc::new(TokioDispatcher),
//!         SwrConfig {
//!             soft_ttl_ms: 60_000,
//!             hard_ttl_ms: 300_000,
//!             lock_timeout_ms: 30_000,
//!         },
//!     )
//!     .unwrap();
//!
//!     // SWR pattern - the generator receives the actual key
//!     let user = users
//!         .swr("user:123", |id| async move {
//!             // Load from database - 'id' is "user:123"
//!             Ok(format!("User data for {}", id))
//!         })
//!         .await
//!         .unwrap();
//! }
//! ```

mod builder;
mod cache;
mod dispatch;
mod entry;
mod error;
mod lock;
mod store;
pub mod stores;
mod swr;
mod utils;

// Re-export public API
pub use builder::{CacheBuilder, CacheRegistry};
pub use cache::Cache;
pub use dispatch::{Dispatcher, Job, NullDispatcher, TokioDispatcher};
pub use entry::Envelope;
pub use error::CacheError;
pub use lock::LockManager;
pub use store::CounterStore;
pub use stores::memory::{EvictOnSetConfig, MemoryStore, MemoryStoreConfig};
pub use stores::metrics::{CacheMetric, MetricsSink, MetricsStore};
pub use stores::redis::{RedisStore, RedisStoreConfig};
pub use swr::{GeneratorError, SwrCache, SwrConfig, TtlOptions};
