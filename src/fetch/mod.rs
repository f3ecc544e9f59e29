//! Fetch Module
//!
//! Decorators around an expensive `argument -> String` operation: access
//! counting, expiring result caching, and both composed as
//! [`ExpiringCache`].

mod cached;
mod counted;
mod expiring;
mod web;

use crate::error::{CacheError, Result};

pub use cached::{CacheResult, CACHED_PREFIX, DEFAULT_EXPIRATION, MIN_EXPIRATION};
pub use counted::{CountAccess, COUNT_PREFIX};
pub use expiring::ExpiringCache;
pub use web::PageFetcher;

// == Fetch ==
/// An operation producing a string for a string argument, e.g. a URL fetch.
pub trait Fetch {
    fn fetch(&self, argument: &str) -> Result<String>;
}

impl<T: Fetch + ?Sized> Fetch for &T {
    fn fetch(&self, argument: &str) -> Result<String> {
        (**self).fetch(argument)
    }
}

// == Fetch Fn ==
/// Adapts a closure into a [`Fetch`]. Its errors become
/// [`CacheError::Fetch`].
#[derive(Debug, Clone)]
pub struct FetchFn<F> {
    f: F,
}

/// Wraps `f` as a [`Fetch`].
pub fn fetch_fn<F>(f: F) -> FetchFn<F>
where
    F: Fn(&str) -> anyhow::Result<String>,
{
    FetchFn { f }
}

impl<F> Fetch for FetchFn<F>
where
    F: Fn(&str) -> anyhow::Result<String>,
{
    fn fetch(&self, argument: &str) -> Result<String> {
        (self.f)(argument).map_err(|source| CacheError::fetch(argument, source))
    }
}
