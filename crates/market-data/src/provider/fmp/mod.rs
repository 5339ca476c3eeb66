//! Financial Modeling Prep search provider.
//!
//! Uses the `/api/v3/search` ticker search endpoint. Symbols come back
//! exchange-qualified already (e.g. "RELIANCE.NS", "TCS.BO").
//!
//! API documentation: https://site.financialmodelingprep.com/developer/docs

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::http::{build_client, get_text, parse_json, require_key};
use crate::errors::MarketDataError;
use crate::models::SearchResult;
use crate::provider::SearchProvider;

const BASE_URL: &str = "https://financialmodelingprep.com";
const PROVIDER_ID: &str = "FMP";

// ============================================================================
// API Response Structures
// ============================================================================

/// Individual item of the /api/v3/search response array
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchItem {
    symbol: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    currency: Option<String>,
    /// Long exchange name (e.g., "National Stock Exchange of India")
    #[serde(default)]
    stock_exchange: Option<String>,
    /// Short exchange code (e.g., "NSE")
    #[serde(default)]
    exchange_short_name: Option<String>,
}

/// Error payload. FMP sometimes returns it with a 200 status.
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(rename = "Error Message")]
    error_message: String,
}

/// Either a result list or an error object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SearchResponse {
    Items(Vec<SearchItem>),
    Error(ErrorResponse),
}

// ============================================================================
// FmpProvider
// ============================================================================

/// Financial Modeling Prep search provider.
///
/// Highest-priority networked source. Without an API key every search fails
/// with `MissingApiKey` and no request is made.
pub struct FmpProvider {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl FmpProvider {
    /// Create a new provider. `None` or a blank key disables it.
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: build_client(),
            api_key,
            base_url: BASE_URL.to_string(),
        }
    }

    /// Point the provider at a different host (used by tests and proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn search_symbols(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<SearchResult>, MarketDataError> {
        let api_key = require_key(PROVIDER_ID, self.api_key.as_deref())?;
        let url = format!("{}/api/v3/search", self.base_url);
        let limit = limit.to_string();
        let params = [("query", query), ("limit", limit.as_str()), ("apikey", api_key)];

        let text = get_text(&self.client, PROVIDER_ID, &url, &params).await?;
        let results = parse_search_response(&text)?;

        debug!("FMP: found {} search results for '{}'", results.len(), query);
        Ok(results)
    }
}

#[async_trait]
impl SearchProvider for FmpProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn priority(&self) -> u8 {
        1
    }

    async fn search(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<SearchResult>, MarketDataError> {
        self.search_symbols(query, limit).await
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

fn parse_search_response(body: &str) -> Result<Vec<SearchResult>, MarketDataError> {
    match parse_json::<SearchResponse>(PROVIDER_ID, body)? {
        SearchResponse::Items(items) => Ok(items.into_iter().map(map_item).collect()),
        SearchResponse::Error(e) => Err(MarketDataError::provider_error(
            PROVIDER_ID,
            e.error_message,
        )),
    }
}

fn map_item(item: SearchItem) -> SearchResult {
    let exchange = item
        .exchange_short_name
        .or(item.stock_exchange)
        .unwrap_or_default();
    let name = item.name.unwrap_or_else(|| item.symbol.clone());

    let mut result = SearchResult::new(item.symbol, name, exchange);
    result.currency = item.currency.filter(|c| !c.is_empty());
    result
}

// ============================================================================
// Tests
// ============================================================================
