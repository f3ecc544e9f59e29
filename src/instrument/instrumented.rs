//! Instrumented Store Module
//!
//! A [`ValueStore`] whose `store` calls are counted and recorded under an
//! explicit operation name.

use std::io::Write;

use crate::backend::KeyValueStore;
use crate::error::Result;
use crate::instrument::{CallRecord, CallRecorder, ValueStore};
use crate::value::StoredValue;

/// Operation name used when none is given.
pub const DEFAULT_OPERATION: &str = "Cache.store";

// == Instrumented Store ==
#[derive(Debug, Clone)]
pub struct InstrumentedStore<S> {
    values: ValueStore<S>,
    recorder: CallRecorder<S>,
    operation: String,
}

impl<S: KeyValueStore + Clone> InstrumentedStore<S> {
    /// Instruments `store` calls under [`DEFAULT_OPERATION`].
    pub fn new(store: S) -> Self {
        Self::with_operation(store, DEFAULT_OPERATION)
    }

    /// Instruments `store` calls under `operation`.
    pub fn with_operation(store: S, operation: impl Into<String>) -> Self {
        Self {
            values: ValueStore::new(store.clone()),
            recorder: CallRecorder::new(store),
            operation: operation.into(),
        }
    }
}

impl<S: KeyValueStore> InstrumentedStore<S> {
    pub fn operation(&self) -> &str {
        &self.operation
    }

    // == Store ==
    /// Stores `value` under a fresh key, counting the call and recording
    /// the value and the returned key.
    pub fn store(&self, value: impl Into<StoredValue>) -> Result<String> {
        let value = value.into();
        self.recorder
            .record(&self.operation, &value, || self.values.store(value.clone()))
    }

    // == Get ==
    pub fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.values.get(key)
    }

    pub fn get_with<T, F>(&self, key: &str, decode: F) -> Result<Option<T>>
    where
        F: FnOnce(Vec<u8>) -> Result<T>,
    {
        self.values.get_with(key, decode)
    }

    pub fn get_str(&self, key: &str) -> Result<Option<String>> {
        self.values.get_str(key)
    }

    pub fn get_int(&self, key: &str) -> Result<Option<i64>> {
        self.values.get_int(key)
    }

    // == Diagnostics ==
    /// Number of `store` calls made so far.
    pub fn call_count(&self) -> Result<u64> {
        self.recorder.call_count(&self.operation)
    }

    /// Recorded `store` calls, oldest first.
    pub fn history(&self) -> Result<Vec<CallRecord>> {
        self.recorder.history(&self.operation)
    }

    /// Writes every recorded `store` call to `out`.
    pub fn replay<W: Write>(&self, out: &mut W) -> Result<()> {
        self.recorder.replay(&self.operation, out)
    }
}
