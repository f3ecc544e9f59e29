//! Store Entry Module
//!
//! Defines the structure for individual keys held by the memory store.

use std::time::Duration;

use super::duration_ms;

// == Entry Value ==
/// What a key holds: a plain value or a list.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryValue {
    Bytes(Vec<u8>),
    List(Vec<Vec<u8>>),
}

impl EntryValue {
    /// Redis-style type name, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            EntryValue::Bytes(_) => "string",
            EntryValue::List(_) => "list",
        }
    }
}

// == Store Entry ==
/// A single key with its value and expiry metadata.
#[derive(Debug, Clone)]
pub struct StoreEntry {
    /// The stored value
    pub value: EntryValue,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: u64,
    /// Expiration timestamp (Unix milliseconds), None = no expiration
    pub expires_at: Option<u64>,
}

impl StoreEntry {
    // == Constructor ==
    /// Creates a new entry created at `now_ms`, expiring after `ttl` if given.
    pub fn new(value: EntryValue, ttl: Option<Duration>, now_ms: u64) -> Self {
        Self {
            value,
            created_at: now_ms,
            expires_at: ttl.map(|ttl| now_ms.saturating_add(duration_ms(ttl))),
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired at `now_ms`.
    ///
    /// An entry is expired once `now_ms` reaches the expiration time, so a
    /// TTL that has fully elapsed never yields the value again.
    pub fn is_expired(&self, now_ms: u64) -> bool {
        match self.expires_at {
            Some(expires) => now_ms >= expires,
            None => false,
        }
    }

    // == Time To Live ==
    /// Returns remaining TTL at `now_ms`, or None if no expiration is set.
    ///
    /// # Returns
    /// - `Some(Duration::ZERO)` if the entry has expired
    /// - `Some(remaining)` if the entry has TTL and hasn't expired
    /// - `None` if the entry never expires
    pub fn ttl_remaining(&self, now_ms: u64) -> Option<Duration> {
        self.expires_at
            .map(|expires| Duration::from_millis(expires.saturating_sub(now_ms)))
    }
}
