//! Backend Module
//!
//! The key-value capability set the wrappers depend on, plus the stores
//! that provide it.

mod clock;
mod entry;
mod memory;
#[cfg(feature = "redis")]
mod redis_store;


use std::sync::Arc;
use std::time::Duration;

use crate::error::Result;

// Re-export public types
pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::{EntryValue, StoreEntry};
pub use memory::MemoryStore;
#[cfg(feature = "redis")]
pub use redis_store::RedisStore;

// == Public Constants ==
/// Maximum allowed key length in bytes, the same as Redis
pub const MAX_KEY_LENGTH: usize = 512 * 1024 * 1024; // 512 MB

/// Maximum allowed value size in bytes
pub const MAX_VALUE_SIZE: usize = 16 * 1024 * 1024; // 16 MB

/// Whole milliseconds in `duration`, saturating at `u64::MAX`.
pub(crate) fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

// == Key Value Store ==
/// Capability set of a Redis-like backing store.
///
/// Every method is a single atomic primitive of the store. Callers that
/// chain several of them get no atomicity across the chain.
pub trait KeyValueStore: Send + Sync {
    /// Returns the raw value under `key`, or `None` if absent or expired.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Stores `value` under `key` without expiration.
    fn set(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Stores `value` under `key`, expiring after `ttl`.
    fn set_with_ttl(&self, key: &str, value: &[u8], ttl: Duration) -> Result<()>;

    /// Increments the integer counter under `key` and returns the new value.
    fn incr(&self, key: &str) -> Result<i64>;

    /// Appends `item` to the list under `key` and returns the new length.
    fn rpush(&self, key: &str, item: &[u8]) -> Result<usize>;

    /// Returns list items from `start` to `stop` inclusive.
    ///
    /// Negative indexes count from the end, so `(0, -1)` is the whole list.
    fn lrange(&self, key: &str, start: isize, stop: isize) -> Result<Vec<Vec<u8>>>;

    /// Drops every key. Destructive.
    fn flush_all(&self) -> Result<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        (**self).set(key, value)
    }

    fn set_with_ttl(&self, key: &str, value: &[u8], ttl: Duration) -> Result<()> {
        (**self).set_with_ttl(key, value, ttl)
    }

    fn incr(&self, key: &str) -> Result<i64> {
        (**self).incr(key)
    }

    fn rpush(&self, key: &str, item: &[u8]) -> Result<usize> {
        (**self).rpush(key, item)
    }

    fn lrange(&self, key: &str, start: isize, stop: isize) -> Result<Vec<Vec<u8>>> {
        (**self).lrange(key, start, stop)
    }

    fn flush_all(&self) -> Result<()> {
        (**self).flush_all()
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Arc<S> {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        (**self).set(key, value)
    }

    fn set_with_ttl(&self, key: &str, value: &[u8], ttl: Duration) -> Result<()> {
        (**self).set_with_ttl(key, value, ttl)
    }

    fn incr(&self, key: &str) -> Result<i64> {
        (**self).incr(key)
    }

    fn rpush(&self, key: &str, item: &[u8]) -> Result<usize> {
        (**self).rpush(key, item)
    }

    fn lrange(&self, key: &str, start: isize, stop: isize) -> Result<Vec<Vec<u8>>> {
        (**self).lrange(key, start, stop)
    }

    fn flush_all(&self) -> Result<()> {
        (**self).flush_all()
    }
}
