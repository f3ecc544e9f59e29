//! Expiring result cache decorator.

use std::time::Duration;

use tracing::debug;

use crate::backend::KeyValueStore;
use crate::error::{CacheError, Result};
use crate::fetch::Fetch;
use crate::value::decode_utf8;

/// Key prefix of cached results: `cached:{argument}`.
pub const CACHED_PREFIX: &str = "cached";

/// Expiration window used when none is given.
pub const DEFAULT_EXPIRATION: Duration = Duration::from_secs(10);

/// Shortest window the backing stores can hold: one whole millisecond.
pub const MIN_EXPIRATION: Duration = Duration::from_millis(1);

/// Serves results from the store while they are fresh and refetches once
/// the backing store has expired them.
///
/// Failed fetches are not cached; the next request tries again.
#[derive(Debug, Clone)]
pub struct CacheResult<S, F> {
    store: S,
    inner: F,
    expiration: Duration,
}

impl<S: KeyValueStore, F: Fetch> CacheResult<S, F> {
    pub fn new(store: S, inner: F) -> Self {
        Self {
            store,
            inner,
            expiration: DEFAULT_EXPIRATION,
        }
    }

    /// Fails with `InvalidRequest` for windows under [`MIN_EXPIRATION`].
    pub fn with_expiration(store: S, inner: F, expiration: Duration) -> Result<Self> {
        if expiration < MIN_EXPIRATION {
            return Err(CacheError::InvalidRequest(format!(
                "expiration must be at least 1ms, got {:?}",
                expiration
            )));
        }

        Ok(Self {
            store,
            inner,
            expiration,
        })
    }

    pub fn expiration(&self) -> Duration {
        self.expiration
    }

    /// Whether a fresh result for `argument` is held.
    pub fn is_cached(&self, argument: &str) -> Result<bool> {
        Ok(self.store.get(&cache_key(argument))?.is_some())
    }
}

impl<S: KeyValueStore, F: Fetch> Fetch for CacheResult<S, F> {
    fn fetch(&self, argument: &str) -> Result<String> {
        let key = cache_key(argument);

        if let Some(cached) = self.store.get(&key)? {
            debug!(argument, "Cache hit");
            return decode_utf8(cached);
        }

        debug!(argument, "Cache miss");
        let result = self.inner.fetch(argument)?;
        self.store
            .set_with_ttl(&key, result.as_bytes(), self.expiration)?;
        Ok(result)
    }
}

fn cache_key(argument: &str) -> String {
    format!("{}:{}", CACHED_PREFIX, argument)
}
