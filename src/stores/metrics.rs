//! Metrics middleware for counter stores.
//!
//! This module provides a `MetricsStore` wrapper that emits metrics for all
//! store operations (reads, writes, deletes, counter movements) to a
//! user-provided sink. The sink is the boundary to whatever observability
//! system the application runs; this crate never interprets the metrics.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use herd_cache::{Cache, CounterStore, MemoryStore, MemoryStoreConfig};
//! use herd_cache::{CacheMetric, MetricsSink, MetricsStore};
//!
//! // Create metrics sink
//! let sink = Arc::new(MyMetricsSink::new());
//!
//! // Wrap store with metrics
//! let memory = Arc::new(MemoryStore::new(MemoryStoreConfig::default()));
//! let store: Arc<dyn CounterStore> = Arc::new(MetricsStore::new(memory, sink.clone()));
//!
//! // Use in Cache - metrics emitted automatically
//! let cache: Cache<String> = Cache::new("users", store, dispatcher, config)?;
//! ```

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;

use crate::error::CacheError;
use crate::store::CounterStore;

/// Metrics emitted by the MetricsStore wrapper.
#[derive(Debug, Clone)]
pub enum CacheMetric {
    /// Emitted on every payload read (get) operation.
    Read {
        /// The storage key that was read.
        key: String,
        /// Whether the key was found in the store.
        hit: bool,
        /// Latency of the operation in milliseconds.
        latency_ms: f64,
        /// Name of the wrapped store (from CounterStore::name()).
        store: String,
    },
    /// Emitted on every payload write (set) operation.
    Write {
        /// The storage key that was written.
        key: String,
        /// Latency of the operation in milliseconds.
        latency_ms: f64,
        /// Name of the wrapped store.
        store: String,
    },
    /// Emitted on every delete operation.
    Delete {
        /// The storage key that was deleted.
        key: String,
        /// Latency of the operation in milliseconds.
        latency_ms: f64,
        /// Name of the wrapped store.
        store: String,
    },
    /// Emitted on every counter increment, lock acquisition attempts
    /// included.
    Incr {
        /// The counter key.
        key: String,
        /// The resulting counter value, if the operation succeeded.
        result: Option<i64>,
        /// Latency of the operation in milliseconds.
        latency_ms: f64,
        /// Name of the wrapped store.
        store: String,
    },
    /// Emitted on every counter decrement.
    Decr {
        /// The counter key.
        key: String,
        /// The resulting counter value, if the operation succeeded.
        result: Option<i64>,
        /// Latency of the operation in milliseconds.
        latency_ms: f64,
        /// Name of the wrapped store.
        store: String,
    },
}

/// Trait for receiving cache metrics.
///
/// Implement this trait to collect metrics from `MetricsStore`.
///
/// # Example
///
/// ```ignore
/// use std::sync::Mutex;
/// use async_trait::async_trait;
/// use herd_cache::{CacheMetric, MetricsSink};
///
/// struct BufferedSink {
///     buffer: Mutex<Vec<CacheMetric>>,
/// }
///
/// #[async_trait]
/// impl MetricsSink for BufferedSink {
///     fn emit(&self, metric: CacheMetric) {
///         self.buffer.lock().unwrap().push(metric);
///     }
///
///     async fn flush(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
///         // Send buffered metrics to your backend
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait MetricsSink: Send + Sync {
    /// Emit a single metric.
    ///
    /// This is called synchronously in the hot path of cache operations.
    /// Implementations should be fast (e.g., buffer metrics in memory).
    fn emit(&self, metric: CacheMetric);

    /// Flush any buffered metrics.
    ///
    /// Called when the caller wants to ensure all metrics are persisted.
    /// This is typically called at shutdown or at periodic intervals.
    async fn flush(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// A store wrapper that emits metrics for all operations.
///
/// `MetricsStore` wraps any `CounterStore` implementation and emits metrics
/// for read, write, delete, and counter operations to a user-provided sink.
///
/// # Example
///
/// ```ignore
/// let inner = Arc::new(MemoryStore::new(MemoryStoreConfig::default()));
/// let sink = Arc::new(MyMetricsSink::new());
/// let store: Arc<dyn CounterStore> = Arc::new(MetricsStore::new(inner, sink));
///
/// // Use store normally - metrics are emitted automatically
/// store.get("users::data:user:123").await?;
/// ```
pub struct MetricsStore {
    inner: Arc<dyn CounterStore>,
    sink: Arc<dyn MetricsSink>,
    store_name: String,
}

impl MetricsStore {
    /// Create a new MetricsStore wrapping the given store.
    ///
    /// # Arguments
    /// * `inner` - The store to wrap
    /// * `sink` - The metrics sink to emit metrics to
    pub fn new(inner: Arc<dyn CounterStore>, sink: Arc<dyn MetricsSink>) -> Self {
        let store_name = inner.name().to_string();
        MetricsStore {
            inner,
            sink,
            store_name,
        }
    }

    /// Get a reference to the metrics sink.
    pub fn sink(&self) -> &Arc<dyn MetricsSink> {
        &self.sink
    }

    fn elapsed_ms(start: Instant) -> f64 {
        start.elapsed().as_secs_f64() * 1000.0
    }
}

#[async_trait]
impl CounterStore for MetricsStore {
    fn name(&self) -> &'static str {
        "metrics"
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let start = Instant::now();
        let result = self.inner.get(key).await;
        let latency_ms = Self::elapsed_ms(start);

        let hit = matches!(&result, Ok(Some(_)));

        self.sink.emit(CacheMetric::Read {
            key: key.to_string(),
            hit,
            latency_ms,
            store: self.store_name.clone(),
        });

        result
    }

    async fn set(&self, key: &str, payload: String, ttl_ms: i64) -> Result<(), CacheError> {
        let start = Instant::now();
        let result = self.inner.set(key, payload, ttl_ms).await;
        let latency_ms = Self::elapsed_ms(start);

        self.sink.emit(CacheMetric::Write {
            key: key.to_string(),
            latency_ms,
            store: self.store_name.clone(),
        });

        result
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let start = Instant::now();
        let result = self.inner.delete(key).await;
        let latency_ms = Self::elapsed_ms(start);

        self.sink.emit(CacheMetric::Delete {
            key: key.to_string(),
            latency_ms,
            store: self.store_name.clone(),
        });

        result
    }

    async fn incr(&self, key: &str, delta: i64, ttl_ms: i64) -> Result<i64, CacheError> {
        let start = Instant::now();
        let result = self.inner.incr(key, delta, ttl_ms).await;
        let latency_ms = Self::elapsed_ms(start);

        self.sink.emit(CacheMetric::Incr {
            key: key.to_string(),
            result: result.as_ref().ok().copied(),
            latency_ms,
            store: self.store_name.clone(),
        });

        result
    }

    async fn decr(&self, key: &str, delta: i64) -> Result<i64, CacheError> {
        let start = Instant::now();
        let result = self.inner.decr(key, delta).await;
        let latency_ms = Self::elapsed_ms(start);

        self.sink.emit(CacheMetric::Decr {
            key: key.to_string(),
            result: result.as_ref().ok().copied(),
            latency_ms,
            store: self.store_name.clone(),
        });

        result
    }
}
