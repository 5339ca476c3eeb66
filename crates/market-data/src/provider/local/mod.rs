//! Local fallback provider.
//!
//! Serves a small built-in instrument list so searches still return something
//! useful when both networked providers are down, unconfigured or out of quota
//! (offline demos, expired keys). Matching is a case-insensitive substring
//! test against symbol, name and sector, in list order.

mod catalog;

use async_trait::async_trait;

use crate::errors::MarketDataError;
use crate::models::SearchResult;
use crate::provider::SearchProvider;

use self::catalog::{CatalogEntry, CATALOG, TRENDING};

const PROVIDER_ID: &str = "LOCAL";

/// Search provider over a static instrument list.
#[derive(Clone, Debug)]
pub struct LocalProvider {
    instruments: Vec<SearchResult>,
    trending: Vec<String>,
}

impl LocalProvider {
    /// Provider over the built-in instrument list.
    pub fn new() -> Self {
        Self {
            instruments: CATALOG.iter().map(to_result).collect(),
            trending: TRENDING.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Provider over a caller-supplied list. The trending list is empty.
    pub fn with_instruments(instruments: Vec<SearchResult>) -> Self {
        let instruments = instruments
            .into_iter()
            .map(|r| r.with_source(PROVIDER_ID))
            .collect();
        Self {
            instruments,
            trending: Vec::new(),
        }
    }

    /// Replace the trending list with the given symbols, in display order.
    pub fn with_trending(mut self, symbols: &[&str]) -> Self {
        self.trending = symbols.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Entries matching `query`, at most `limit`, in list order.
    ///
    /// A blank query matches nothing.
    pub fn matches(&self, query: &str, limit: usize) -> Vec<SearchResult> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }

        self.instruments
            .iter()
            .filter(|r| is_match(r, &needle))
            .take(limit)
            .cloned()
            .collect()
    }

    /// The curated trending list. Symbols missing from the list are skipped.
    pub fn trending(&self) -> Vec<SearchResult> {
        self.trending
            .iter()
            .filter_map(|symbol| self.instruments.iter().find(|r| &r.symbol == symbol))
            .cloned()
            .collect()
    }

    /// Number of instruments in the list.
    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }
}

impl Default for LocalProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SearchProvider for LocalProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn priority(&self) -> u8 {
        // Always last: only fills whatever the networked providers left open.
        u8::MAX
    }

    async fn search(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<SearchResult>, MarketDataError> {
        Ok(self.matches(query, limit))
    }
}

fn is_match(result: &SearchResult, needle: &str) -> bool {
    result.symbol.to_lowercase().contains(needle)
        || result.name.to_lowercase().contains(needle)
        || result
            .sector
            .as_deref()
            .is_some_and(|sector| sector.to_lowercase().contains(needle))
}

fn to_result(entry: &CatalogEntry) -> SearchResult {
    SearchResult::new(entry.symbol, entry.name, entry.exchange)
        .with_currency(entry.currency)
        .with_asset_type("Common Stock")
        .with_sector(entry.sector)
        .with_country(entry.country)
        .with_source(PROVIDER_ID)
}
