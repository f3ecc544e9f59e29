//! KV Tracker - demo application
//!
//! Stores a few values through an instrumented store, replays the recorded
//! calls, then fetches every URL given on the command line twice through an
//! expiring page cache.

use std::env;
use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kv_tracker::{
    spawn_cleanup_task, Config, ExpiringCache, InstrumentedStore, KeyValueStore, MemoryStore,
    PageFetcher, StoredValue,
};

/// Main entry point.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Open the backing store (Redis or memory, with its cleanup task)
/// 4. Flush the store if configured to
/// 5. Run the demo on a blocking thread
/// 6. Stop the cleanup task
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kv_tracker=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting KV Tracker");

    let config = Config::from_env();
    info!(
        "Configuration loaded: max_entries={}, cache_expiration={}s, cleanup_interval={}s, redis={}",
        config.max_entries,
        config.cache_expiration,
        config.cleanup_interval,
        config.redis_url.is_some()
    );

    let (store, cleanup_handle) = open_store(&config)?;

    if config.flush_on_start {
        store.flush_all()?;
        warn!("Backing store flushed, all previous data is gone");
    }

    let urls: Vec<String> = env::args().skip(1).collect();
    let result = tokio::task::spawn_blocking(move || run(store, &config, &urls)).await?;

    if let Some(handle) = cleanup_handle {
        handle.abort();
    }

    info!("Shutdown complete");
    result
}

/// Opens Redis when a URL is configured, otherwise a memory store with its
/// background cleanup task.
fn open_store(
    config: &Config,
) -> anyhow::Result<(Arc<dyn KeyValueStore>, Option<JoinHandle<()>>)> {
    if let Some(url) = &config.redis_url {
        return Ok((connect_redis(url)?, None));
    }

    let memory = Arc::new(MemoryStore::new(config.max_entries));
    let handle = spawn_cleanup_task(memory.clone(), config.cleanup_interval);
    info!("Memory store initialized");

    let store: Arc<dyn KeyValueStore> = memory;
    Ok((store, Some(handle)))
}

#[cfg(feature = "redis")]
fn connect_redis(url: &str) -> anyhow::Result<Arc<dyn KeyValueStore>> {
    Ok(Arc::new(kv_tracker::backend::RedisStore::connect(url)?))
}

#[cfg(not(feature = "redis"))]
fn connect_redis(_url: &str) -> anyhow::Result<Arc<dyn KeyValueStore>> {
    anyhow::bail!("REDIS_URL is set but kv_tracker was built without the `redis` feature")
}

fn run(store: Arc<dyn KeyValueStore>, config: &Config, urls: &[String]) -> anyhow::Result<()> {
    let cache = InstrumentedStore::new(store.clone());

    let samples = [
        StoredValue::from("foo"),
        StoredValue::from(b"bar".to_vec()),
        StoredValue::from(42),
        StoredValue::from(2.5),
    ];
    let mut keys = Vec::with_capacity(samples.len());
    for value in samples {
        keys.push(cache.store(value)?);
    }

    let text = cache.get_str(&keys[0])?;
    let number = cache.get_int(&keys[2])?;
    info!(?text, ?number, "Read back values");
    cache.replay(&mut std::io::stdout().lock())?;

    if urls.is_empty() {
        info!("No URLs given, skipping page cache");
        return Ok(());
    }

    let pages = ExpiringCache::with_expiration(
        store,
        PageFetcher::new(config.fetch_timeout())?,
        config.cache_expiration(),
    )?;

    for url in urls {
        for _ in 0..2 {
            match pages.access(url) {
                Ok(page) => info!(url = %url, bytes = page.len(), "Page served"),
                Err(e) => warn!(url = %url, "Page fetch failed: {}", e),
            }
        }
        info!(url = %url, count = pages.access_count(url)?, "Access count");
    }

    Ok(())
}
