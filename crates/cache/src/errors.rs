//! Error types for the cache crate.
//!
//! These never reach callers of [`CacheService`](crate::CacheService); the
//! service logs them and returns a not-found or `false` result instead. They
//! are visible to code that drives a [`CacheStore`](crate::CacheStore) directly.

use std::time::Duration;

use thiserror::Error;

/// Errors raised by a backing store.
#[derive(Error, Debug)]
pub enum CacheError {
    /// The Redis client or connection reported an error.
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// A value could not be converted to or from JSON.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Establishing the Redis connection took longer than allowed.
    #[error("Connection timed out after {0:?}")]
    ConnectTimeout(Duration),

    /// A store call did not complete within the operation timeout.
    #[error("Cache {operation} timed out after {after:?}")]
    OperationTimeout {
        operation: &'static str,
        after: Duration,
    },

    /// No Redis connection string was configured.
    #[error("Networked cache not configured")]
    NotConfigured,
}

impl CacheError {
    /// Whether the error means the networked store is unreachable.
    ///
    /// The service treats these as a lost connection and switches to the
    /// in-process store. Other errors (a bad payload, a wrong-type key) only
    /// fail the current call.
    pub fn is_connection_error(&self) -> bool {
        match self {
            Self::Redis(e) => {
                e.is_connection_dropped()
                    || e.is_connection_refusal()
                    || e.is_io_error()
                    || e.is_timeout()
            }
            Self::ConnectTimeout(_) | Self::OperationTimeout { .. } | Self::NotConfigured => true,
            Self::Serialization(_) => false,
        }
    }
}
