//! Error types for the store wrappers
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the backing stores and the wrappers built on them.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Key or value rejected by the backing store
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Operation against a key holding the wrong kind of value
    #[error("Wrong type: {0}")]
    WrongType(String),

    /// Store is at capacity and nothing could be purged
    #[error("Cache full: {0}")]
    CacheFull(String),

    /// Stored bytes could not be interpreted as the requested type
    #[error("Decode error: {0}")]
    Decode(String),

    /// Backing store failure
    #[error("Backend error: {0}")]
    Backend(String),

    #[cfg(feature = "redis")]
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// Call snapshot could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped fetch operation failed
    #[error("Fetch failed for '{argument}': {source}")]
    Fetch {
        argument: String,
        #[source]
        source: anyhow::Error,
    },
}

impl CacheError {
    /// Wraps a fetch failure for `argument`.
    pub fn fetch(argument: &str, source: impl Into<anyhow::Error>) -> Self {
        CacheError::Fetch {
            argument: argument.to_string(),
            source: source.into(),
        }
    }
}

// == Result Type Alias ==
/// Convenience Result type for the crate.
pub type Result<T> = std::result::Result<T, CacheError>;
