//! KV Tracker - instrumented key-value storage and an expiring fetch cache
//!
//! Wraps a Redis-like backing store to count and replay stored calls, and to
//! memoize expensive fetches for a fixed window while counting accesses.

pub mod backend;
pub mod config;
pub mod error;
pub mod fetch;
pub mod instrument;
pub mod tasks;
pub mod value;

pub use backend::{KeyValueStore, MemoryStore};
pub use config::Config;
pub use error::{CacheError, Result};
pub use fetch::{fetch_fn, ExpiringCache, Fetch, PageFetcher};
pub use instrument::InstrumentedStore;
pub use tasks::spawn_cleanup_task;
pub use value::StoredValue;
