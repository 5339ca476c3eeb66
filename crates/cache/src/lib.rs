//! TradeBro Cache Crate
//!
//! A get/set/delete/clear cache with per-entry TTL that hides which backing
//! store is in use.
//!
//! # Overview
//!
//! - [`RedisStore`] - networked store, values serialized as JSON strings
//! - [`MemoryStore`] - bounded in-process map with a periodic expiry sweep
//! - [`CacheService`] - picks a store at startup and degrades to memory
//!
//! # State machine
//!
//! ```text
//! Uninitialized --(REDIS_URL set)--> Connecting --ok--> Ready(redis)
//!       |                                |                   |
//!       |                               err          connection lost
//!       v                                v                   v
//!  Ready(memory) <-----------------------+-------------------+
//! ```
//!
//! Degrading is one-way: once the service falls back to memory it stays there
//! until the process restarts.

pub mod config;
pub mod errors;
#[cfg(test)]
mod fake_redis;
pub mod service;
pub mod store;

pub use config::CacheConfig;
pub use errors::CacheError;
pub use service::{CacheService, CacheState, CacheStats};
pub use store::{spawn_sweeper, BackendKind, CacheStore, MemoryStats, MemoryStore, RedisStore};
