//! Expiring Cache Module
//!
//! Access counting and expiring result caching composed around one fetch
//! operation.

use std::time::Duration;

use crate::backend::KeyValueStore;
use crate::error::Result;
use crate::fetch::{CacheResult, CountAccess, Fetch};

// == Expiring Cache ==
/// Memoizes `fetch` per argument for a fixed window and counts every
/// access attempt, hit or miss.
///
/// Per argument the cache is either absent or fresh. The backing store
/// owns expiry; an expired entry is simply never returned by it.
///
/// # Example
/// ```ignore
/// let store = Arc::new(MemoryStore::new(1000));
/// let pages = ExpiringCache::new(store, PageFetcher::new(Duration::from_secs(30))?);
/// let html = pages.access("http://example.com")?;
/// assert_eq!(pages.access_count("http://example.com")?, 1);
/// ```
#[derive(Debug, Clone)]
pub struct ExpiringCache<S, F> {
    inner: CountAccess<S, CacheResult<S, F>>,
}

impl<S: KeyValueStore + Clone, F: Fetch> ExpiringCache<S, F> {
    /// Caches `fetch` for [`DEFAULT_EXPIRATION`](crate::fetch::DEFAULT_EXPIRATION).
    pub fn new(store: S, fetch: F) -> Self {
        let cached = CacheResult::new(store.clone(), fetch);
        Self {
            inner: CountAccess::new(store, cached),
        }
    }

    /// Caches `fetch` for `expiration`, which must be at least
    /// [`MIN_EXPIRATION`](crate::fetch::MIN_EXPIRATION).
    pub fn with_expiration(store: S, fetch: F, expiration: Duration) -> Result<Self> {
        let cached = CacheResult::with_expiration(store.clone(), fetch, expiration)?;
        Ok(Self {
            inner: CountAccess::new(store, cached),
        })
    }
}

impl<S: KeyValueStore, F: Fetch> ExpiringCache<S, F> {
    // == Access ==
    /// Counts the access, then returns the fresh cached result or fetches,
    /// caches and returns a new one.
    pub fn access(&self, argument: &str) -> Result<String> {
        self.inner.fetch(argument)
    }

    /// Number of accesses made for `argument`.
    pub fn access_count(&self, argument: &str) -> Result<u64> {
        self.inner.access_count(argument)
    }

    /// Whether a fresh result for `argument` is held.
    pub fn is_cached(&self, argument: &str) -> Result<bool> {
        self.inner.inner().is_cached(argument)
    }

    pub fn expiration(&self) -> Duration {
        self.inner.inner().expiration()
    }
}

impl<S: KeyValueStore, F: Fetch> Fetch for ExpiringCache<S, F> {
    fn fetch(&self, argument: &str) -> Result<String> {
        self.access(argument)
    }
}
