//! Redis backing store.
//!
//! Maps the store capability set onto plain Redis commands over one
//! synchronous connection.

use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use redis::{Client, Commands, Connection};
use tracing::{debug, info};

use crate::backend::{duration_ms, KeyValueStore};
use crate::error::{CacheError, Result};

/// Redis implementation of KeyValueStore.
pub struct RedisStore {
    conn: Mutex<Connection>,
}

impl RedisStore {
    /// Connect to a Redis server.
    ///
    /// # Arguments
    /// * `url` - Redis connection URL (e.g., redis://localhost:6379)
    pub fn connect(url: &str) -> Result<Self> {
        let client = Client::open(url)?;
        let conn = client.get_connection()?;

        info!(url = %url, "Connected to Redis");

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| CacheError::Backend("redis connection lock poisoned".to_string()))
    }
}

impl KeyValueStore for RedisStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut guard = self.conn()?;
        let conn: &mut Connection = &mut guard;

        let value: Option<Vec<u8>> = conn.get(key)?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        let mut guard = self.conn()?;
        let conn: &mut Connection = &mut guard;

        let _: () = conn.set(key, value)?;
        Ok(())
    }

    fn set_with_ttl(&self, key: &str, value: &[u8], ttl: Duration) -> Result<()> {
        let mut guard = self.conn()?;
        let conn: &mut Connection = &mut guard;

        let ttl_ms = duration_ms(ttl);
        let _: () = conn.pset_ex(key, value, ttl_ms)?;
        debug!(key = %key, ttl_ms, "Stored expiring value in Redis");
        Ok(())
    }

    fn incr(&self, key: &str) -> Result<i64> {
        let mut guard = self.conn()?;
        let conn: &mut Connection = &mut guard;

        let value: i64 = conn.incr(key, 1)?;
        Ok(value)
    }

    fn rpush(&self, key: &str, item: &[u8]) -> Result<usize> {
        let mut guard = self.conn()?;
        let conn: &mut Connection = &mut guard;

        let len: usize = conn.rpush(key, item)?;
        Ok(len)
    }

    fn lrange(&self, key: &str, start: isize, stop: isize) -> Result<Vec<Vec<u8>>> {
        let mut guard = self.conn()?;
        let conn: &mut Connection = &mut guard;

        let items: Vec<Vec<u8>> = conn.lrange(key, start, stop)?;
        Ok(items)
    }

    fn flush_all(&self) -> Result<()> {
        let mut guard = self.conn()?;
        let conn: &mut Connection = &mut guard;

        let _: () = redis::cmd("FLUSHDB").query(conn)?;
        info!("Flushed Redis database");
        Ok(())
    }
}
