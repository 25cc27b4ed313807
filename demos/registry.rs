//! Example demonstrating a registry of named caches over one shared store.
//!
//! Two cacheable computations share the same counter store and dispatcher
//! but live in isolated namespaces with their own timing configuration.

use std::sync::Arc;

use herd_cache::{
    Cache, CacheBuilder, MemoryStore, MemoryStoreConfig, SwrConfig, TokioDispatcher,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "debug".into()),
        )
        .init();

    // One store, shared by every cache. Swap in RedisStore for a deployment
    // spanning multiple processes.
    let store = Arc::new(MemoryStore::new(MemoryStoreConfig::default()));
    let dispatcher = Arc::new(TokioDispatcher);

    let users: Cache<String> = Cache::new(
        "users",
        store.clone(),
        dispatcher.clone(),
        SwrConfig {
            soft_ttl_ms: 60_000,
            hard_ttl_ms: 300_000,
            lock_timeout_ms: 30_000,
        },
    )?;
    let sessions: Cache<String> = Cache::new(
        "sessions",
        store,
        dispatcher,
        SwrConfig {
            soft_ttl_ms: 5_000,
            hard_ttl_ms: 30_000,
            lock_timeout_ms: 10_000,
        },
    )?;

    let registry = CacheBuilder::new()
        .add("users", users)
        .add("sessions", sessions)
        .build();

    // First read computes synchronously; later reads are fresh hits until
    // the soft horizon passes, after which one reader triggers a background
    // regeneration while everyone keeps getting the stale value.
    let users = registry.cache("users");
    let profile = users
        .swr("user:123", |id| async move {
            println!("loading {} from origin", id);
            Ok(format!("profile for {}", id))
        })
        .await?;
    println!("got: {}", profile);

    let profile = users
        .swr("user:123", |_id| async move {
            unreachable!("fresh value, origin not consulted")
        })
        .await?;
    println!("got again: {}", profile);

    users.invalidate("user:123").await?;
    println!("invalidated, cached = {:?}", users.get("user:123").await?);

    Ok(())
}
