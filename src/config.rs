//! Configuration Module
//!
//! Handles loading application configuration from environment variables.

use std::env;
use std::time::Duration;

use tracing::warn;

/// Application configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of keys the memory store can hold
    pub max_entries: usize,
    /// Expiration window of cached fetch results, in seconds
    pub cache_expiration: u64,
    /// Background cleanup task interval in seconds
    pub cleanup_interval: u64,
    /// Timeout for page fetches, in seconds
    pub fetch_timeout: u64,
    /// Whether to flush the backing store on startup
    pub flush_on_start: bool,
    /// Redis URL; the memory store is used when unset
    pub redis_url: Option<String>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MAX_ENTRIES` - Maximum memory store keys (default: 100000)
    /// - `CACHE_EXPIRATION` - Cached result lifetime in seconds (default: 10)
    /// - `CLEANUP_INTERVAL` - Cleanup frequency in seconds (default: 1)
    /// - `FETCH_TIMEOUT` - Page fetch timeout in seconds (default: 30)
    /// - `FLUSH_ON_START` - Flush the store on startup, `1`/`0`, `true`/`false`,
    ///   `yes`/`no` or `on`/`off` (default: true)
    /// - `REDIS_URL` - Redis connection URL (default: unset)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_entries: parse_var("MAX_ENTRIES").unwrap_or(defaults.max_entries),
            cache_expiration: parse_var("CACHE_EXPIRATION").unwrap_or(defaults.cache_expiration),
            cleanup_interval: parse_var("CLEANUP_INTERVAL").unwrap_or(defaults.cleanup_interval),
            fetch_timeout: parse_var("FETCH_TIMEOUT").unwrap_or(defaults.fetch_timeout),
            flush_on_start: flag_var("FLUSH_ON_START").unwrap_or(defaults.flush_on_start),
            redis_url: env::var("REDIS_URL").ok().filter(|url| !url.is_empty()),
        }
    }

    pub fn cache_expiration(&self) -> Duration {
        Duration::from_secs(self.cache_expiration)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_entries: 100_000,
            cache_expiration: 10,
            cleanup_interval: 1,
            fetch_timeout: 30,
            flush_on_start: true,
            redis_url: None,
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = env::var(name).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(var = name, value = %raw, "Unparsable value, using default");
            None
        }
    }
}

fn flag_var(name: &str) -> Option<bool> {
    let raw = env::var(name).ok()?;
    let flag = parse_flag(&raw);
    if flag.is_none() {
        warn!(var = name, value = %raw, "Not a boolean flag, using default");
    }
    flag
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
