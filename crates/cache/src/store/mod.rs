//! Backing store abstraction.
//!
//! The service talks to exactly one [`CacheStore`] at a time. Which one is
//! decided by configuration at startup, see [`CacheService`](crate::CacheService).

mod memory;
mod redis_store;

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::errors::CacheError;

pub use self::memory::{spawn_sweeper, MemoryStats, MemoryStore};
pub use self::redis_store::RedisStore;

/// Which kind of store is serving requests.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Redis,
    Memory,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Redis => write!(f, "redis"),
            Self::Memory => write!(f, "memory"),
        }
    }
}

/// A key-value store holding JSON values with a per-entry TTL.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// The kind of store, reported in stats.
    fn kind(&self) -> BackendKind;

    /// Fetch a value. Expired entries are reported as `None`.
    async fn get(&self, key: &str) -> Result<Option<Value>, CacheError>;

    /// Store a value that expires after `ttl`.
    async fn set(&self, key: &str, value: Value, ttl: Duration) -> Result<(), CacheError>;

    /// Remove a value, returning whether one was present.
    async fn delete(&self, key: &str) -> Result<bool, CacheError>;

    /// Remove every entry owned by this store.
    async fn clear(&self) -> Result<(), CacheError>;

    /// Check that the store is answering. In-process stores always are.
    async fn ping(&self) -> Result<(), CacheError> {
        Ok(())
    }
}
