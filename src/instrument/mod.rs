//! Instrument Module
//!
//! Typed value storage with per-operation call counting and history.

mod instrumented;
mod recorder;
mod values;

pub use instrumented::{InstrumentedStore, DEFAULT_OPERATION};
pub use recorder::{CallRecord, CallRecorder};
pub use values::ValueStore;
