use std::{net::SocketAddr, str::FromStr, time::Duration};

use anyhow::Context;
use tradebro_cache::CacheConfig;
use tradebro_market_data::DEFAULT_PROVIDER_TIMEOUT;

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;
const DEFAULT_SEARCH_CACHE_TTL_SECS: u64 = 300;

/// Output format of the log subscriber.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Text
        }
    }
}

pub struct Config {
    pub listen_addr: SocketAddr,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
    pub cache: CacheConfig,
    pub fmp_api_key: Option<String>,
    pub twelve_data_api_key: Option<String>,
    pub provider_timeout: Duration,
    /// TTL of cached `/search/stocks` responses.
    pub search_cache_ttl: Duration,
    pub log_format: LogFormat,
}

impl Config {
    /// Load configuration from the process environment (and `.env`, if any).
    ///
    /// Call this before installing the log subscriber so `.env` can set
    /// `RUST_LOG` and `TB_LOG_FORMAT`.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// Unparseable numbers fall back to their defaults; an unparseable listen
    /// address is an error.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_addr = lookup("TB_LISTEN_ADDR").unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string());
        let listen_addr: SocketAddr = raw_addr
            .trim()
            .parse()
            .with_context(|| format!("Invalid TB_LISTEN_ADDR: {}", raw_addr))?;

        let cors_allow = lookup("TB_CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let defaults = CacheConfig::default();
        let mut cache = CacheConfig {
            redis_url: None,
            key_prefix: lookup("TB_CACHE_KEY_PREFIX").unwrap_or(defaults.key_prefix),
            default_ttl: Duration::from_secs(parse_or(
                &lookup,
                "TB_CACHE_DEFAULT_TTL_SECS",
                defaults.default_ttl.as_secs(),
            )),
            max_entries: parse_or(&lookup, "TB_CACHE_MAX_ENTRIES", defaults.max_entries),
            sweep_interval: Duration::from_secs(parse_or(
                &lookup,
                "TB_CACHE_SWEEP_SECS",
                defaults.sweep_interval.as_secs(),
            )),
            connect_timeout: Duration::from_millis(parse_or(
                &lookup,
                "TB_CACHE_CONNECT_TIMEOUT_MS",
                defaults.connect_timeout.as_millis() as u64,
            )),
            operation_timeout: Duration::from_millis(parse_or(
                &lookup,
                "TB_CACHE_OPERATION_TIMEOUT_MS",
                defaults.operation_timeout.as_millis() as u64,
            )),
        };
        if let Some(url) = lookup("REDIS_URL") {
            cache = cache.with_redis_url(url);
        }

        Ok(Self {
            listen_addr,
            cors_allow,
            request_timeout: Duration::from_millis(parse_or(
                &lookup,
                "TB_REQUEST_TIMEOUT_MS",
                DEFAULT_REQUEST_TIMEOUT_MS,
            )),
            cache,
            fmp_api_key: non_blank(lookup("FMP_API_KEY")),
            twelve_data_api_key: non_blank(lookup("TWELVE_DATA_API_KEY")),
            provider_timeout: Duration::from_millis(parse_or(
                &lookup,
                "TB_PROVIDER_TIMEOUT_MS",
                DEFAULT_PROVIDER_TIMEOUT.as_millis() as u64,
            )),
            search_cache_ttl: Duration::from_secs(parse_or(
                &lookup,
                "TB_SEARCH_CACHE_TTL_SECS",
                DEFAULT_SEARCH_CACHE_TTL_SECS,
            )),
            log_format: lookup("TB_LOG_FORMAT")
                .map(|raw| LogFormat::parse(&raw))
                .unwrap_or_default(),
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    lookup(key)
        .and_then(|raw| raw.trim().parse().ok())
        .unwrap_or(default)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
