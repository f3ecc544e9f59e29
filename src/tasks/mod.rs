//! Background Tasks Module
//!
//! Contains background tasks that run periodically alongside the memory store.
//!
//! # Tasks
//! - TTL Cleanup: Purges expired keys at configured intervals

mod cleanup;

pub use cleanup::spawn_cleanup_task;
