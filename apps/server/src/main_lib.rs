use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};
use tradebro_cache::CacheService;
use tradebro_market_data::{
    FmpProvider, LocalProvider, SearchAggregator, SearchProvider, TwelveDataProvider,
};

use crate::config::{Config, LogFormat};

pub struct AppState {
    pub cache: Arc<CacheService>,
    pub search: Arc<SearchAggregator>,
    pub search_cache_ttl: Duration,
}

impl AppState {
    pub fn new(
        cache: Arc<CacheService>,
        search: Arc<SearchAggregator>,
        search_cache_ttl: Duration,
    ) -> Arc<Self> {
        Arc::new(Self {
            cache,
            search,
            search_cache_ttl,
        })
    }
}

pub fn init_tracing(log_format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format == LogFormat::Json {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let cache = Arc::new(CacheService::new(config.cache.clone()));
    let cache_state = cache.initialize().await;
    tracing::info!("Cache ready: {:?}", cache_state);

    let providers: Vec<Arc<dyn SearchProvider>> = vec![
        Arc::new(FmpProvider::new(config.fmp_api_key.clone())),
        Arc::new(TwelveDataProvider::new(config.twelve_data_api_key.clone())),
    ];
    for (name, key) in [
        ("FMP_API_KEY", &config.fmp_api_key),
        ("TWELVE_DATA_API_KEY", &config.twelve_data_api_key),
    ] {
        if key.is_none() {
            tracing::warn!("{} not set, provider will be skipped", name);
        }
    }

    let search = SearchAggregator::new(providers, Arc::new(LocalProvider::new()))
        .with_provider_timeout(config.provider_timeout);
    tracing::info!("Search providers: {:?}", search.provider_ids());

    Ok(AppState::new(
        cache,
        Arc::new(search),
        config.search_cache_ttl,
    ))
}
