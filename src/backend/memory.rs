//! Memory Store Module
//!
//! In-process backing store: a HashMap of entries with TTL expiration,
//! guarded by a single mutex so every operation is atomic.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tracing::debug;

use crate::backend::{
    duration_ms, Clock, EntryValue, KeyValueStore, StoreEntry, SystemClock, MAX_KEY_LENGTH,
    MAX_VALUE_SIZE,
};
use crate::error::{CacheError, Result};

type Entries = HashMap<String, StoreEntry>;

// == Memory Store ==
/// Redis-like key-value store held in process memory.
///
/// Expired keys are dropped lazily when touched and in bulk by
/// [`MemoryStore::cleanup_expired`]. When full, new keys are refused rather
/// than evicting live ones.
#[derive(Debug)]
pub struct MemoryStore {
    /// Key-value storage
    entries: Mutex<Entries>,
    /// Time source for TTL bookkeeping
    clock: Arc<dyn Clock>,
    /// Maximum number of keys allowed
    max_entries: usize,
}

impl MemoryStore {
    // == Constructor ==
    /// Creates a new MemoryStore holding at most `max_entries` keys.
    pub fn new(max_entries: usize) -> Self {
        Self::with_clock(max_entries, Arc::new(SystemClock))
    }

    /// Creates a new MemoryStore reading time from `clock`.
    pub fn with_clock(max_entries: usize, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock,
            max_entries,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Entries>> {
        self.entries
            .lock()
            .map_err(|_| CacheError::Backend("memory store lock poisoned".to_string()))
    }

    // == Cleanup Expired ==
    /// Removes all expired keys.
    ///
    /// Returns the number of keys removed.
    pub fn cleanup_expired(&self) -> Result<usize> {
        let now = self.clock.now_ms();
        let mut entries = self.lock()?;

        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        let removed = before - entries.len();

        if removed > 0 {
            debug!(removed, "Purged expired keys");
        }
        Ok(removed)
    }

    // == TTL ==
    /// Returns the remaining time to live of `key`.
    ///
    /// `None` if the key is absent or has no expiration.
    pub fn ttl(&self, key: &str) -> Result<Option<Duration>> {
        let now = self.clock.now_ms();
        let mut entries = self.lock()?;
        Ok(live_entry(&mut entries, key, now).and_then(|entry| entry.ttl_remaining(now)))
    }

    // == Length ==
    /// Returns the current number of keys, including expired ones not yet purged.
    pub fn len(&self) -> Result<usize> {
        Ok(self.lock()?.len())
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.lock()?.is_empty())
    }

    fn insert_bytes(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<()> {
        validate_key(key)?;
        validate_value(value)?;

        let now = self.clock.now_ms();
        let mut entries = self.lock()?;
        self.ensure_capacity(&mut entries, key, now)?;

        let entry = StoreEntry::new(EntryValue::Bytes(value.to_vec()), ttl, now);
        entries.insert(key.to_string(), entry);
        Ok(())
    }

    /// Makes room for `key` if it is new, purging expired keys first.
    fn ensure_capacity(&self, entries: &mut Entries, key: &str, now: u64) -> Result<()> {
        if entries.contains_key(key) || entries.len() < self.max_entries {
            return Ok(());
        }

        entries.retain(|_, entry| !entry.is_expired(now));
        if entries.len() < self.max_entries {
            return Ok(());
        }

        Err(CacheError::CacheFull(format!(
            "store holds the maximum of {} keys",
            self.max_entries
        )))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(crate::config::Config::default().max_entries)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let now = self.clock.now_ms();
        let mut entries = self.lock()?;

        match live_entry(&mut entries, key, now) {
            None => Ok(None),
            Some(StoreEntry {
                value: EntryValue::Bytes(bytes),
                ..
            }) => Ok(Some(bytes.clone())),
            Some(entry) => Err(wrong_type(key, entry.value.kind())),
        }
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        self.insert_bytes(key, value, None)
    }

    fn set_with_ttl(&self, key: &str, value: &[u8], ttl: Duration) -> Result<()> {
        // Whole milliseconds only, like PSETEX
        if duration_ms(ttl) == 0 {
            return Err(CacheError::InvalidRequest(format!(
                "invalid expire time for key '{}'",
                key
            )));
        }
        self.insert_bytes(key, value, Some(ttl))
    }

    fn incr(&self, key: &str) -> Result<i64> {
        validate_key(key)?;

        let now = self.clock.now_ms();
        let mut entries = self.lock()?;

        if let Some(entry) = live_entry(&mut entries, key, now) {
            let bytes = match &mut entry.value {
                EntryValue::Bytes(bytes) => bytes,
                EntryValue::List(_) => return Err(wrong_type(key, "list")),
            };
            let next = parse_counter(bytes)
                .and_then(|current| current.checked_add(1))
                .ok_or_else(|| {
                    CacheError::InvalidRequest(format!(
                        "value of '{}' is not an integer or out of range",
                        key
                    ))
                })?;
            // Existing TTL is kept
            *bytes = next.to_string().into_bytes();
            return Ok(next);
        }

        self.ensure_capacity(&mut entries, key, now)?;
        let entry = StoreEntry::new(EntryValue::Bytes(b"1".to_vec()), None, now);
        entries.insert(key.to_string(), entry);
        Ok(1)
    }

    fn rpush(&self, key: &str, item: &[u8]) -> Result<usize> {
        validate_key(key)?;
        validate_value(item)?;

        let now = self.clock.now_ms();
        let mut entries = self.lock()?;

        if let Some(entry) = live_entry(&mut entries, key, now) {
            let items = match &mut entry.value {
                EntryValue::List(items) => items,
                EntryValue::Bytes(_) => return Err(wrong_type(key, "string")),
            };
            items.push(item.to_vec());
            return Ok(items.len());
        }

        self.ensure_capacity(&mut entries, key, now)?;
        let entry = StoreEntry::new(EntryValue::List(vec![item.to_vec()]), None, now);
        entries.insert(key.to_string(), entry);
        Ok(1)
    }

    fn lrange(&self, key: &str, start: isize, stop: isize) -> Result<Vec<Vec<u8>>> {
        let now = self.clock.now_ms();
        let mut entries = self.lock()?;

        match live_entry(&mut entries, key, now) {
            None => Ok(Vec::new()),
            Some(StoreEntry {
                value: EntryValue::List(items),
                ..
            }) => Ok(match range_bounds(items.len(), start, stop) {
                Some((from, to)) => items[from..=to].to_vec(),
                None => Vec::new(),
            }),
            Some(entry) => Err(wrong_type(key, entry.value.kind())),
        }
    }

    fn flush_all(&self) -> Result<()> {
        let mut entries = self.lock()?;
        let flushed = entries.len();
        entries.clear();

        debug!(flushed, "Flushed memory store");
        Ok(())
    }
}

// == Helpers ==
/// Returns the entry for `key`, dropping it first if it has expired.
fn live_entry<'a>(entries: &'a mut Entries, key: &str, now: u64) -> Option<&'a mut StoreEntry> {
    if entries.get(key).is_some_and(|entry| entry.is_expired(now)) {
        entries.remove(key);
    }
    entries.get_mut(key)
}

fn wrong_type(key: &str, kind: &str) -> CacheError {
    CacheError::WrongType(format!("key '{}' holds a {} value", key, kind))
}

fn parse_counter(bytes: &[u8]) -> Option<i64> {
    std::str::from_utf8(bytes).ok()?.parse().ok()
}

/// Resolves Redis-style inclusive, possibly negative, list indexes.
fn range_bounds(len: usize, start: isize, stop: isize) -> Option<(usize, usize)> {
    let len = len as isize;
    let start = if start < 0 { (len + start).max(0) } else { start };
    let stop = if stop < 0 { len + stop } else { stop.min(len - 1) };

    if start >= len || start > stop {
        return None;
    }
    Some((start as usize, stop as usize))
}

fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(CacheError::InvalidRequest("Key cannot be empty".to_string()));
    }
    if key.len() > MAX_KEY_LENGTH {
        return Err(CacheError::InvalidRequest(format!(
            "Key exceeds maximum length of {} bytes",
            MAX_KEY_LENGTH
        )));
    }
    Ok(())
}

fn validate_value(value: &[u8]) -> Result<()> {
    if value.len() > MAX_VALUE_SIZE {
        return Err(CacheError::InvalidRequest(format!(
            "Value exceeds maximum size of {} bytes",
            MAX_VALUE_SIZE
        )));
    }
    Ok(())
}
