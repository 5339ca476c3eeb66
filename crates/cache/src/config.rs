use std::time::Duration;

/// Default TTL applied by [`CacheService::set_default`](crate::CacheService::set_default).
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Default entry bound of the in-process store.
pub const DEFAULT_MAX_ENTRIES: usize = 1000;

/// Default interval between expiry sweeps of the in-process store.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Default upper bound on establishing the Redis connection.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

/// Default upper bound on a single store call once connected.
pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_millis(500);

/// Default namespace for keys written to Redis.
pub const DEFAULT_KEY_PREFIX: &str = "tradebro:";

/// Cache configuration.
#[derive(Clone, Debug)]
pub struct CacheConfig {
    /// Redis connection string. `None` selects the in-process store directly.
    pub redis_url: Option<String>,
    /// Prefix prepended to every Redis key.
    pub key_prefix: String,
    /// TTL used when the caller does not pass one.
    pub default_ttl: Duration,
    /// Maximum number of entries held by the in-process store.
    pub max_entries: usize,
    /// How often expired in-process entries are swept.
    pub sweep_interval: Duration,
    /// How long `initialize` waits for Redis before falling back.
    pub connect_timeout: Duration,
    /// How long a single Redis call may take before the connection is
    /// considered lost.
    pub operation_timeout: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            redis_url: None,
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            default_ttl: DEFAULT_TTL,
            max_entries: DEFAULT_MAX_ENTRIES,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            operation_timeout: DEFAULT_OPERATION_TIMEOUT,
        }
    }
}

impl CacheConfig {
    /// Set the Redis connection string. Blank strings count as unset.
    pub fn with_redis_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.redis_url = if url.trim().is_empty() { None } else { Some(url) };
        self
    }

    /// The configured Redis URL, if any.
    pub fn redis_url(&self) -> Option<&str> {
        self.redis_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}
