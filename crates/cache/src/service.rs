//! Cache service selecting and supervising the active backing store.

use std::future::Future;
use std::sync::{Arc, Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use crate::config::CacheConfig;
use crate::errors::CacheError;
use crate::store::{spawn_sweeper, BackendKind, CacheStore, MemoryStats, MemoryStore, RedisStore};

/// Lifecycle of the cache service.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CacheState {
    Uninitialized,
    Connecting,
    Ready(BackendKind),
}

impl CacheState {
    fn label(&self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Connecting => "connecting",
            Self::Ready(_) => "ready",
        }
    }
}

/// Point-in-time view of the cache for diagnostics.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub backend: BackendKind,
    pub status: &'static str,
    pub ready: bool,
    /// Whether a networked store is currently serving requests. Call
    /// [`CacheService::ping`] first for a live answer.
    pub connected: bool,
    /// Whether the service fell back after losing its networked store.
    pub degraded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory: Option<MemoryStats>,
}

/// Cache facade used by the rest of the application.
///
/// Every operation swallows store errors: reads degrade to `None`, writes to
/// `false`. Calls to Redis are bounded by `operation_timeout`. A
/// connection-class error, including that timeout, switches the service to
/// the in-process store for the rest of the process lifetime.
pub struct CacheService {
    config: CacheConfig,
    active: RwLock<Arc<dyn CacheStore>>,
    memory: Arc<MemoryStore>,
    state: RwLock<CacheState>,
    degraded: RwLock<bool>,
    sweeper: Mutex<Option<JoinHandle<()>>>,
}

impl CacheService {
    /// Create an uninitialized service. Until [`initialize`](Self::initialize)
    /// runs, requests are served by the in-process store.
    pub fn new(config: CacheConfig) -> Self {
        let memory = Arc::new(MemoryStore::new(config.max_entries));
        let active: Arc<dyn CacheStore> = memory.clone();
        Self {
            config,
            active: RwLock::new(active),
            memory,
            state: RwLock::new(CacheState::Uninitialized),
            degraded: RwLock::new(false),
            sweeper: Mutex::new(None),
        }
    }

    /// Create a service that serves from the given store, already `Ready`.
    ///
    /// The in-process store still backs the service if `store` loses its
    /// connection.
    pub fn with_store(config: CacheConfig, store: Arc<dyn CacheStore>) -> Self {
        let service = Self::new(config);
        let kind = store.kind();
        *service.write_active() = store;
        *service.write_state() = CacheState::Ready(kind);
        service
    }

    /// Select the backing store.
    ///
    /// With a Redis URL configured, connects within `connect_timeout`; any
    /// failure falls back to the in-process store. Without one, the service is
    /// ready immediately without touching the network. Must be called inside a
    /// Tokio runtime because it starts the expiry sweeper.
    pub async fn initialize(&self) -> CacheState {
        self.start_sweeper();

        let Some(url) = self.config.redis_url().map(str::to_string) else {
            info!("No Redis URL configured, using in-process cache");
            return self.use_memory();
        };

        *self.write_state() = CacheState::Connecting;
        debug!("Connecting to Redis cache");

        let connect = RedisStore::connect(&url, self.config.key_prefix.clone());
        let result = match timeout(self.config.connect_timeout, connect).await {
            Ok(result) => result,
            Err(_) => Err(CacheError::ConnectTimeout(self.config.connect_timeout)),
        };

        match result {
            Ok(store) => {
                info!("Redis cache connected");
                *self.write_active() = Arc::new(store);
                let state = CacheState::Ready(BackendKind::Redis);
                *self.write_state() = state;
                state
            }
            Err(e) => {
                warn!("Redis cache unavailable, using in-process cache: {}", e);
                self.use_memory()
            }
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> CacheState {
        *self.read_state()
    }

    /// Kind of the store currently serving requests.
    pub fn backend(&self) -> BackendKind {
        self.active().kind()
    }

    /// TTL used by [`set_default`](Self::set_default).
    pub fn default_ttl(&self) -> Duration {
        self.config.default_ttl
    }

    /// Fetch and deserialize a value. Errors and type mismatches read as `None`.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.get_value(key).await?;
        match serde_json::from_value(value) {
            Ok(typed) => Some(typed),
            Err(e) => {
                warn!("Cached value for '{}' has an unexpected shape: {}", key, e);
                None
            }
        }
    }

    /// Fetch the raw JSON value stored under `key`.
    pub async fn get_value(&self, key: &str) -> Option<Value> {
        let store = self.active();
        match self.bounded(&store, "get", store.get(key)).await {
            Ok(value) => value,
            Err(e) => {
                if self.handle_store_error(&store, "get", key, &e) {
                    self.memory.get(key).await.ok().flatten()
                } else {
                    None
                }
            }
        }
    }

    /// Store `value` under `key` for `ttl`. Returns whether the write succeeded.
    ///
    /// A zero TTL is rejected.
    pub async fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T, ttl: Duration) -> bool {
        if ttl.is_zero() {
            warn!("Refusing to cache '{}' with a zero TTL", key);
            return false;
        }

        let value = match serde_json::to_value(value) {
            Ok(value) => value,
            Err(e) => {
                warn!("Failed to serialize cache value for '{}': {}", key, e);
                return false;
            }
        };

        let store = self.active();
        match self.bounded(&store, "set", store.set(key, value.clone(), ttl)).await {
            Ok(()) => true,
            Err(e) => {
                if self.handle_store_error(&store, "set", key, &e) {
                    self.memory.set(key, value, ttl).await.is_ok()
                } else {
                    false
                }
            }
        }
    }

    /// Store `value` with the configured default TTL.
    pub async fn set_default<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> bool {
        self.set(key, value, self.config.default_ttl).await
    }

    /// Remove `key`, returning whether an entry was removed.
    pub async fn delete(&self, key: &str) -> bool {
        let store = self.active();
        match self.bounded(&store, "delete", store.delete(key)).await {
            Ok(removed) => removed,
            Err(e) => {
                if self.handle_store_error(&store, "delete", key, &e) {
                    self.memory.delete(key).await.unwrap_or(false)
                } else {
                    false
                }
            }
        }
    }

    /// Remove every entry from the active store. Returns whether it succeeded.
    pub async fn clear(&self) -> bool {
        let store = self.active();
        match self.bounded(&store, "clear", store.clear()).await {
            Ok(()) => {
                info!("Cache cleared ({})", store.kind());
                true
            }
            Err(e) => {
                if self.handle_store_error(&store, "clear", "*", &e) {
                    self.memory.clear().await.is_ok()
                } else {
                    false
                }
            }
        }
    }

    /// Check that the active store still answers.
    ///
    /// A networked store that fails or stalls is dropped in favour of the
    /// in-process store. Returns whether the store serving requests after the
    /// check is usable.
    pub async fn ping(&self) -> bool {
        let store = self.active();
        match self.bounded(&store, "ping", store.ping()).await {
            Ok(()) => true,
            Err(e) => {
                if self.handle_store_error(&store, "ping", "-", &e) {
                    self.memory.ping().await.is_ok()
                } else {
                    false
                }
            }
        }
    }

    /// Report the backend in use and, for the in-process store, its counters.
    pub fn stats(&self) -> CacheStats {
        let backend = self.backend();
        let state = self.state();
        CacheStats {
            backend,
            status: state.label(),
            ready: matches!(state, CacheState::Ready(_)),
            connected: matches!(state, CacheState::Ready(BackendKind::Redis)),
            degraded: *self.degraded.read().unwrap_or_else(|p| p.into_inner()),
            memory: (backend == BackendKind::Memory).then(|| self.memory.stats()),
        }
    }

    /// Run a store call, bounding networked stores by `operation_timeout`.
    async fn bounded<T>(
        &self,
        store: &Arc<dyn CacheStore>,
        operation: &'static str,
        call: impl Future<Output = Result<T, CacheError>>,
    ) -> Result<T, CacheError> {
        if store.kind() == BackendKind::Memory {
            return call.await;
        }
        let after = self.config.operation_timeout;
        timeout(after, call)
            .await
            .unwrap_or_else(|_| Err(CacheError::OperationTimeout { operation, after }))
    }

    /// Log a store error and degrade to memory if the networked store is gone.
    ///
    /// Returns `true` when the service just switched stores, in which case the
    /// caller retries the operation against the in-process store.
    fn handle_store_error(
        &self,
        store: &Arc<dyn CacheStore>,
        operation: &str,
        key: &str,
        err: &CacheError,
    ) -> bool {
        if store.kind() == BackendKind::Redis && err.is_connection_error() {
            error!(
                "Redis cache connection lost during {} '{}': {}",
                operation, key, err
            );
            self.degrade();
            return true;
        }

        warn!("Cache {} failed for '{}': {}", operation, key, err);
        false
    }

    fn degrade(&self) {
        let mut active = self.write_active();
        if active.kind() == BackendKind::Memory {
            return;
        }
        let memory: Arc<dyn CacheStore> = self.memory.clone();
        *active = memory;
        drop(active);

        *self.write_state() = CacheState::Ready(BackendKind::Memory);
        *self.degraded.write().unwrap_or_else(|p| p.into_inner()) = true;
        warn!("Cache degraded to in-process store");
    }

    fn use_memory(&self) -> CacheState {
        let memory: Arc<dyn CacheStore> = self.memory.clone();
        *self.write_active() = memory;
        let state = CacheState::Ready(BackendKind::Memory);
        *self.write_state() = state;
        state
    }

    fn start_sweeper(&self) {
        let mut sweeper = self.sweeper.lock().unwrap_or_else(|p| p.into_inner());
        if sweeper.is_none() {
            *sweeper = Some(spawn_sweeper(&self.memory, self.config.sweep_interval));
        }
    }

    fn active(&self) -> Arc<dyn CacheStore> {
        self.read_active().clone()
    }

    // Lock poisoning only means a writer panicked mid-swap of an `Arc`; the
    // stored value is still a valid store, so recover instead of panicking.
    fn read_active(&self) -> RwLockReadGuard<'_, Arc<dyn CacheStore>> {
        self.active.read().unwrap_or_else(|p| p.into_inner())
    }

    fn write_active(&self) -> RwLockWriteGuard<'_, Arc<dyn CacheStore>> {
        self.active.write().unwrap_or_else(|p| p.into_inner())
    }

    fn read_state(&self) -> RwLockReadGuard<'_, CacheState> {
        self.state.read().unwrap_or_else(|p| p.into_inner())
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, CacheState> {
        self.state.write().unwrap_or_else(|p| p.into_inner())
    }
}

impl Drop for CacheService {
    fn drop(&mut self) {
        if let Some(handle) = self
            .sweeper
            .get_mut()
            .unwrap_or_else(|p| p.into_inner())
            .take()
        {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake_redis::FakeRedis;
    use async_trait::async_trait;
    use serde::Deserialize;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Instant;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Holding {
        symbol: String,
        quantity: u32,
        tags: Vec<String>,
    }

    fn holding() -> Holding {
        Holding {
            symbol: "RELIANCE.NS".to_string(),
            quantity: 12,
            tags: vec!["energy".to_string()],
        }
    }

    /// Stand-in for a networked store whose connection can be cut.
    struct FlakyStore {
        inner: MemoryStore,
        connected: std::sync::atomic::AtomicBool,
        calls: AtomicUsize,
    }

    impl FlakyStore {
        fn new() -> Self {
            Self {
                inner: MemoryStore::new(100),
                connected: std::sync::atomic::AtomicBool::new(true),
                calls: AtomicUsize::new(0),
            }
        }

        fn disconnect(&self) {
            self.connected.store(false, Ordering::SeqCst);
        }

        fn check(&self) -> Result<(), CacheError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.connected.load(Ordering::SeqCst) {
                Ok(())
            } else {
                let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "broken pipe");
                Err(CacheError::Redis(redis::RedisError::from(io)))
            }
        }
    }

    #[async_trait]
    impl CacheStore for FlakyStore {
        fn kind(&self) -> BackendKind {
            BackendKind::Redis
        }

        async fn get(&self, key: &str) -> Result<Option<Value>, CacheError> {
            self.check()?;
            self.inner.get(key).await
        }

        async fn set(&self, key: &str, value: Value, ttl: Duration) -> Result<(), CacheError> {
            self.check()?;
            self.inner.set(key, value, ttl).await
        }

        async fn delete(&self, key: &str) -> Result<bool, CacheError> {
            self.check()?;
            self.inner.delete(key).await
        }

        async fn clear(&self) -> Result<(), CacheError> {
            self.check()?;
            self.inner.clear().await
        }

        async fn ping(&self) -> Result<(), CacheError> {
            self.check()
        }
    }

    /// Networked store that accepts calls and never answers them.
    struct StalledStore;

    #[async_trait]
    impl CacheStore for StalledStore {
        fn kind(&self) -> BackendKind {
            BackendKind::Redis
        }

        async fn get(&self, _key: &str) -> Result<Option<Value>, CacheError> {
            std::future::pending().await
        }

        async fn set(&self, _key: &str, _value: Value, _ttl: Duration) -> Result<(), CacheError> {
            std::future::pending().await
        }

        async fn delete(&self, _key: &str) -> Result<bool, CacheError> {
            std::future::pending().await
        }

        async fn clear(&self) -> Result<(), CacheError> {
            std::future::pending().await
        }
    }

    /// Networked store that rejects values with a non-connection error.
    struct WrongTypeStore;

    #[async_trait]
    impl CacheStore for WrongTypeStore {
        fn kind(&self) -> BackendKind {
            BackendKind::Redis
        }

        async fn get(&self, _key: &str) -> Result<Option<Value>, CacheError> {
            Err(CacheError::Redis(redis::RedisError::from((
                redis::ErrorKind::TypeError,
                "WRONGTYPE",
            ))))
        }

        async fn set(&self, _key: &str, _value: Value, _ttl: Duration) -> Result<(), CacheError> {
            Ok(())
        }

        async fn delete(&self, _key: &str) -> Result<bool, CacheError> {
            Ok(false)
        }

        async fn clear(&self) -> Result<(), CacheError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_initialize_without_url_is_instant_and_local() {
        let service = CacheService::new(CacheConfig::default());
        assert_eq!(service.state(), CacheState::Uninitialized);

        let started = Instant::now();
        let state = service.initialize().await;

        assert!(started.elapsed() < Duration::from_millis(100));
        assert_eq!(state, CacheState::Ready(BackendKind::Memory));
        assert_eq!(service.backend(), BackendKind::Memory);
    }

    #[tokio::test]
    async fn test_initialize_with_unreachable_redis_falls_back() {
        let config = CacheConfig {
            connect_timeout: Duration::from_millis(500),
            ..CacheConfig::default()
        }
        .with_redis_url("redis://127.0.0.1:1/");
        let service = CacheService::new(config);

        let started = Instant::now();
        let state = service.initialize().await;

        assert!(started.elapsed() < Duration::from_secs(2));
        assert_eq!(state, CacheState::Ready(BackendKind::Memory));
        assert!(!service.stats().connected);
    }

    #[tokio::test]
    async fn test_initialize_with_malformed_url_falls_back() {
        let config = CacheConfig::default().with_redis_url("definitely not a url");
        let service = CacheService::new(config);

        assert_eq!(
            service.initialize().await,
            CacheState::Ready(BackendKind::Memory)
        );
    }

    #[tokio::test]
    async fn test_round_trip_in_memory_mode() {
        let service = CacheService::new(CacheConfig::default());
        service.initialize().await;

        assert!(service.set_default("holding", &holding()).await);

        assert_eq!(service.get::<Holding>("holding").await, Some(holding()));
    }

    #[tokio::test]
    async fn test_round_trip_in_networked_mode() {
        let store = Arc::new(FlakyStore::new());
        let service = CacheService::with_store(CacheConfig::default(), store.clone());
        assert_eq!(service.state(), CacheState::Ready(BackendKind::Redis));

        assert!(
            service
                .set("holding", &holding(), Duration::from_secs(60))
                .await
        );

        assert_eq!(service.get::<Holding>("holding").await, Some(holding()));
        assert_eq!(store.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_entries_expire_after_ttl() {
        let service = CacheService::new(CacheConfig::default());
        service.initialize().await;

        assert!(service.set("k", &json!("v"), Duration::from_secs(2)).await);
        tokio::time::advance(Duration::from_secs(3)).await;

        assert_eq!(service.get::<String>("k").await, None);
    }

    #[tokio::test]
    async fn test_get_missing_returns_none() {
        let service = CacheService::new(CacheConfig::default());
        assert_eq!(service.get::<Holding>("missing").await, None);
    }

    #[tokio::test]
    async fn test_get_with_mismatched_type_returns_none() {
        let service = CacheService::new(CacheConfig::default());
        assert!(service.set_default("k", &json!({"not": "a holding"})).await);

        assert_eq!(service.get::<Holding>("k").await, None);
    }

    #[tokio::test]
    async fn test_zero_ttl_is_rejected() {
        let service = CacheService::new(CacheConfig::default());
        assert!(!service.set("k", &1, Duration::ZERO).await);
        assert_eq!(service.get::<i32>("k").await, None);
    }

    #[tokio::test]
    async fn test_delete_and_clear() {
        let service = CacheService::new(CacheConfig::default());
        service.set_default("a", &1).await;
        service.set_default("b", &2).await;

        assert!(service.delete("a").await);
        assert!(!service.delete("a").await);

        assert!(service.clear().await);
        assert_eq!(service.get::<i32>("b").await, None);
    }

    #[tokio::test]
    async fn test_connection_loss_degrades_to_memory() {
        let store = Arc::new(FlakyStore::new());
        let service = CacheService::with_store(CacheConfig::default(), store.clone());
        service.set_default("before", &1).await;

        store.disconnect();

        assert_eq!(service.get::<i32>("before").await, None);
        assert_eq!(service.state(), CacheState::Ready(BackendKind::Memory));
        assert!(service.stats().degraded);

        assert!(service.set_default("after", &2).await);
        assert_eq!(service.get::<i32>("after").await, Some(2));

        // No re-promotion: the networked store is never consulted again.
        let calls = store.calls.load(Ordering::SeqCst);
        service.get::<i32>("after").await;
        assert_eq!(store.calls.load(Ordering::SeqCst), calls);
    }

    #[tokio::test]
    async fn test_write_during_connection_loss_lands_in_memory() {
        let store = Arc::new(FlakyStore::new());
        let service = CacheService::with_store(CacheConfig::default(), store.clone());
        store.disconnect();

        assert!(service.set_default("k", &"v").await);
        assert_eq!(service.backend(), BackendKind::Memory);
        assert_eq!(service.get::<String>("k").await, Some("v".to_string()));
    }

    #[tokio::test]
    async fn test_non_connection_error_does_not_degrade() {
        let service = CacheService::with_store(CacheConfig::default(), Arc::new(WrongTypeStore));

        assert_eq!(service.get::<i32>("k").await, None);
        assert_eq!(service.backend(), BackendKind::Redis);
        assert!(!service.stats().degraded);
    }

    #[tokio::test]
    async fn test_stats_in_memory_mode() {
        let service = CacheService::new(CacheConfig::default());
        service.initialize().await;
        service.set_default("k", &1).await;
        service.get::<i32>("k").await;
        service.get::<i32>("missing").await;

        let stats = service.stats();
        assert_eq!(stats.backend, BackendKind::Memory);
        assert_eq!(stats.status, "ready");
        assert!(stats.ready);
        assert!(!stats.connected);

        let memory = stats.memory.unwrap();
        assert_eq!(memory.entries, 1);
        assert_eq!(memory.hits, 1);
        assert_eq!(memory.misses, 1);
        assert_eq!(memory.sets, 1);
    }

    #[tokio::test]
    async fn test_stats_in_networked_mode_omit_memory_counters() {
        let service = CacheService::with_store(CacheConfig::default(), Arc::new(FlakyStore::new()));

        let stats = service.stats();
        assert_eq!(stats.backend, BackendKind::Redis);
        assert!(stats.connected);
        assert!(stats.memory.is_none());

        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["backend"], "redis");
        assert!(json.get("memory").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_store_call_times_out_and_degrades() {
        let config = CacheConfig {
            operation_timeout: Duration::from_millis(500),
            ..CacheConfig::default()
        };
        let service = CacheService::with_store(config, Arc::new(StalledStore));

        assert!(service.set_default("k", &1).await);

        assert_eq!(service.backend(), BackendKind::Memory);
        assert!(service.stats().degraded);
        assert_eq!(service.get::<i32>("k").await, Some(1));
    }

    #[tokio::test]
    async fn test_silent_redis_server_degrades_instead_of_hanging() {
        let server = FakeRedis::start().await;
        let config = CacheConfig {
            operation_timeout: Duration::from_millis(200),
            ..CacheConfig::default()
        }
        .with_redis_url(server.url());
        let service = CacheService::new(config);
        assert_eq!(
            service.initialize().await,
            CacheState::Ready(BackendKind::Redis)
        );
        assert!(service.set_default("warm", &1).await);
        assert_eq!(service.get::<i32>("warm").await, Some(1));

        server.go_silent();

        let started = Instant::now();
        let read = timeout(Duration::from_secs(5), service.get::<i32>("warm")).await;
        assert_eq!(read.ok(), Some(None));
        assert!(started.elapsed() < Duration::from_secs(2));
        assert_eq!(service.backend(), BackendKind::Memory);

        let written = timeout(Duration::from_secs(5), service.set_default("after", &2)).await;
        assert_eq!(written.ok(), Some(true));
        assert_eq!(service.get::<i32>("after").await, Some(2));
    }

    #[tokio::test]
    async fn test_ping_reports_silent_redis_as_disconnected() {
        let server = FakeRedis::start().await;
        let config = CacheConfig {
            operation_timeout: Duration::from_millis(200),
            ..CacheConfig::default()
        }
        .with_redis_url(server.url());
        let service = CacheService::new(config);
        service.initialize().await;
        assert!(service.ping().await);
        assert!(service.stats().connected);

        server.go_silent();

        assert!(service.ping().await);
        let stats = service.stats();
        assert!(!stats.connected);
        assert!(stats.degraded);
        assert_eq!(stats.backend, BackendKind::Memory);
    }

    #[tokio::test]
    async fn test_ping_after_connection_loss_degrades() {
        let store = Arc::new(FlakyStore::new());
        let service = CacheService::with_store(CacheConfig::default(), store.clone());
        assert!(service.ping().await);
        assert_eq!(service.backend(), BackendKind::Redis);

        store.disconnect();

        assert!(service.ping().await);
        assert_eq!(service.backend(), BackendKind::Memory);
        assert!(!service.stats().connected);
    }
}
