//! Access counting decorator.

use tracing::debug;

use crate::backend::KeyValueStore;
use crate::error::Result;
use crate::fetch::Fetch;
use crate::value::decode_int;

/// Key prefix of access counters: `count:{argument}`.
pub const COUNT_PREFIX: &str = "count";

/// Counts every request for an argument before delegating to the inner
/// fetch, whether or not it succeeds.
#[derive(Debug, Clone)]
pub struct CountAccess<S, F> {
    store: S,
    inner: F,
}

impl<S: KeyValueStore, F: Fetch> CountAccess<S, F> {
    pub fn new(store: S, inner: F) -> Self {
        Self { store, inner }
    }

    /// Number of times `argument` has been requested.
    pub fn access_count(&self, argument: &str) -> Result<u64> {
        let count = self
            .store
            .get(&counter_key(argument))?
            .map(decode_int)
            .transpose()?;
        Ok(count.unwrap_or(0).max(0) as u64)
    }

    pub fn inner(&self) -> &F {
        &self.inner
    }
}

impl<S: KeyValueStore, F: Fetch> Fetch for CountAccess<S, F> {
    fn fetch(&self, argument: &str) -> Result<String> {
        let count = self.store.incr(&counter_key(argument))?;
        debug!(argument, count, "Counted access");

        self.inner.fetch(argument)
    }
}

fn counter_key(argument: &str) -> String {
    format!("{}:{}", COUNT_PREFIX, argument)
}
