//! TTL Cleanup Task
//!
//! Background task that periodically purges expired keys from the memory
//! store, alongside the lazy expiry done on access.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::backend::MemoryStore;

/// Spawns a background task that periodically purges expired keys.
///
/// The task runs in an infinite loop, sleeping for the specified interval
/// between sweeps.
///
/// # Arguments
/// * `store` - shared reference to the memory store
/// * `cleanup_interval_secs` - Interval in seconds between sweeps
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during shutdown.
///
/// # Example
/// ```ignore
/// let store = Arc::new(MemoryStore::new(1000));
/// let cleanup_handle = spawn_cleanup_task(store.clone(), 1);
/// // Later, during shutdown:
/// cleanup_handle.abort();
/// ```
pub fn spawn_cleanup_task(store: Arc<MemoryStore>, cleanup_interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(cleanup_interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting TTL cleanup task with interval of {} seconds",
            interval.as_secs()
        );

        loop {
            tokio::time::sleep(interval).await;

            match store.cleanup_expired() {
                Ok(0) => debug!("TTL cleanup: no expired keys found"),
                Ok(removed) => info!("TTL cleanup: removed {} expired keys", removed),
                Err(e) => warn!("TTL cleanup failed: {}", e),
            }
        }
    })
}
