//! Value Store Module
//!
//! Stores primitive values under fresh random keys and reads them back raw
//! or through a decoder.

use tracing::debug;
use uuid::Uuid;

use crate::backend::KeyValueStore;
use crate::error::Result;
use crate::value::{decode_int, decode_utf8, StoredValue};

// == Value Store ==
/// Typed store/get over a backing store.
#[derive(Debug, Clone)]
pub struct ValueStore<S> {
    store: S,
}

impl<S: KeyValueStore> ValueStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns the backing store.
    pub fn backend(&self) -> &S {
        &self.store
    }

    // == Store ==
    /// Writes `value` under a freshly generated UUID key and returns the key.
    pub fn store(&self, value: impl Into<StoredValue>) -> Result<String> {
        let value = value.into();
        let key = Uuid::new_v4().to_string();

        self.store.set(&key, &value.to_bytes())?;

        debug!(key = %key, "Stored value");
        Ok(key)
    }

    // == Get ==
    /// Returns the raw bytes under `key`, or `None` if nothing is stored.
    pub fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.store.get(key)
    }

    /// Returns the value under `key` converted by `decode`.
    ///
    /// `decode` is only called when a value exists.
    pub fn get_with<T, F>(&self, key: &str, decode: F) -> Result<Option<T>>
    where
        F: FnOnce(Vec<u8>) -> Result<T>,
    {
        self.get(key)?.map(decode).transpose()
    }

    /// Returns the value under `key` as UTF-8 text.
    pub fn get_str(&self, key: &str) -> Result<Option<String>> {
        self.get_with(key, decode_utf8)
    }

    /// Returns the value under `key` as an integer.
    pub fn get_int(&self, key: &str) -> Result<Option<i64>> {
        self.get_with(key, decode_int)
    }
}
