//! Networked Redis store.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client};
use serde_json::Value;
use tracing::debug;

use super::{BackendKind, CacheStore};
use crate::errors::CacheError;

/// Keys deleted per `DEL` call when clearing the namespace.
const CLEAR_BATCH: usize = 500;

/// Cache store backed by a Redis server.
///
/// Values are stored as JSON strings under `{prefix}{key}`. The multiplexed
/// connection is cheap to clone, so each call works on its own handle.
pub struct RedisStore {
    conn: MultiplexedConnection,
    prefix: String,
}

impl RedisStore {
    /// Connect to Redis and verify the connection with `PING`.
    pub async fn connect(url: &str, prefix: impl Into<String>) -> Result<Self, CacheError> {
        let client = Client::open(url)?;
        let mut conn = client.get_multiplexed_async_connection().await?;
        let pong: String = redis::cmd("PING").query_async(&mut conn).await?;
        debug!("Redis answered PING with '{}'", pong);

        Ok(Self {
            conn,
            prefix: prefix.into(),
        })
    }

    fn namespaced(&self, key: &str) -> String {
        namespaced_key(&self.prefix, key)
    }
}

#[async_trait]
impl CacheStore for RedisStore {
    fn kind(&self) -> BackendKind {
        BackendKind::Redis
    }

    async fn get(&self, key: &str) -> Result<Option<Value>, CacheError> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn.get(self.namespaced(key)).await?;
        raw.as_deref().map(decode_value).transpose()
    }

    async fn set(&self, key: &str, value: Value, ttl: Duration) -> Result<(), CacheError> {
        let payload = encode_value(&value)?;
        let millis = ttl_millis(ttl);
        let mut conn = self.conn.clone();
        conn.pset_ex::<_, _, ()>(self.namespaced(key), payload, millis)
            .await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, CacheError> {
        let mut conn = self.conn.clone();
        let removed: u64 = conn.del(self.namespaced(key)).await?;
        Ok(removed > 0)
    }

    async fn clear(&self) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();

        if self.prefix.is_empty() {
            let _: () = redis::cmd("FLUSHDB").query_async(&mut conn).await?;
            return Ok(());
        }

        let pattern = format!("{}*", escape_glob(&self.prefix));
        let mut keys: Vec<String> = Vec::new();
        {
            let mut iter = conn.scan_match::<_, String>(pattern).await?;
            while let Some(key) = iter.next_item().await {
                keys.push(key);
            }
        }

        for batch in keys.chunks(CLEAR_BATCH) {
            let _: u64 = conn.del(batch).await?;
        }
        debug!("Cleared {} keys under prefix '{}'", keys.len(), self.prefix);
        Ok(())
    }

    async fn ping(&self) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}

/// Values are stored as compact JSON text.
fn encode_value(value: &Value) -> Result<String, CacheError> {
    Ok(serde_json::to_string(value)?)
}

fn decode_value(payload: &str) -> Result<Value, CacheError> {
    Ok(serde_json::from_str(payload)?)
}

fn namespaced_key(prefix: &str, key: &str) -> String {
    format!("{}{}", prefix, key)
}

/// `PSETEX` rejects a zero expiry, so sub-millisecond TTLs round up.
fn ttl_millis(ttl: Duration) -> u64 {
    u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1)
}

/// Escape Redis glob metacharacters so the prefix matches literally.
fn escape_glob(prefix: &str) -> String {
    let mut escaped = String::with_capacity(prefix.len());
    for c in prefix.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
