//! Call Recorder Module
//!
//! Counts invocations of named operations and keeps their input/output
//! history in the backing store.
//!
//! For an operation named `op`:
//! - `op` holds the call counter
//! - `op:inputs` and `op:outputs` hold JSON snapshots, one per call

use std::fmt;
use std::io::Write;

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::backend::KeyValueStore;
use crate::error::Result;
use crate::value::decode_int;

// == Call Record ==
/// One recorded invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct CallRecord {
    pub input: Value,
    pub output: Value,
}

// == Call Recorder ==
#[derive(Debug, Clone)]
pub struct CallRecorder<S> {
    store: S,
}

impl<S: KeyValueStore> CallRecorder<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    // == Record ==
    /// Runs `call` as one invocation of `operation`.
    ///
    /// The counter is bumped before `call` runs. The input and output
    /// snapshots are appended only once it returns successfully, so a
    /// failed call is counted but leaves no history.
    pub fn record<A, R, F>(&self, operation: &str, input: &A, call: F) -> Result<R>
    where
        A: Serialize + ?Sized,
        R: Serialize,
        F: FnOnce() -> Result<R>,
    {
        let count = self.store.incr(operation)?;
        let output = call()?;

        self.store
            .rpush(&inputs_key(operation), &serde_json::to_vec(input)?)?;
        self.store
            .rpush(&outputs_key(operation), &serde_json::to_vec(&output)?)?;

        debug!(operation, count, "Recorded call");
        Ok(output)
    }

    // == Call Count ==
    /// Returns how many times `operation` has been invoked.
    pub fn call_count(&self, operation: &str) -> Result<u64> {
        let count = self.store.get(operation)?.map(decode_int).transpose()?;
        Ok(count.unwrap_or(0).max(0) as u64)
    }

    // == History ==
    /// Returns the recorded calls of `operation` in invocation order.
    ///
    /// Mismatched list lengths are tolerated: pairing stops at the shorter.
    pub fn history(&self, operation: &str) -> Result<Vec<CallRecord>> {
        let inputs = self.store.lrange(&inputs_key(operation), 0, -1)?;
        let outputs = self.store.lrange(&outputs_key(operation), 0, -1)?;

        inputs
            .iter()
            .zip(outputs.iter())
            .map(|(input, output)| {
                Ok(CallRecord {
                    input: serde_json::from_slice(input)?,
                    output: serde_json::from_slice(output)?,
                })
            })
            .collect()
    }

    // == Replay ==
    /// Writes the call history of `operation` to `out`.
    ///
    /// ```text
    /// Cache.store was called 2 times:
    /// Cache.store("foo") -> "0b3c..."
    /// Cache.store(42) -> "5d1e..."
    /// ```
    pub fn replay<W: Write>(&self, operation: &str, out: &mut W) -> Result<()> {
        let count = self.call_count(operation)?;
        writeln!(out, "{} was called {} times:", operation, count)?;

        for record in self.history(operation)? {
            writeln!(out, "{}", Replayed { operation, record: &record })?;
        }
        Ok(())
    }
}

struct Replayed<'a> {
    operation: &'a str,
    record: &'a CallRecord,
}

impl fmt::Display for Replayed<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({}) -> {}",
            self.operation, self.record.input, self.record.output
        )
    }
}

fn inputs_key(operation: &str) -> String {
    format!("{}:inputs", operation)
}

fn outputs_key(operation: &str) -> String {
    format!("{}:outputs", operation)
}
