//! Twelve Data search provider.
//!
//! Uses the `/symbol_search` endpoint. Twelve Data returns bare tickers with
//! a separate exchange field, so Indian listings are qualified with the
//! Yahoo-style suffix (".NS", ".BO") to line up with the other sources for
//! deduplication.
//!
//! API documentation: https://twelvedata.com/docs#symbol-search

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::http::{build_client, get_text, parse_json, require_key};
use crate::errors::MarketDataError;
use crate::models::SearchResult;
use crate::provider::SearchProvider;

const BASE_URL: &str = "https://api.twelvedata.com";
const PROVIDER_ID: &str = "TWELVE_DATA";

/// Twelve Data caps `outputsize` at 120.
const MAX_OUTPUT_SIZE: usize = 120;

// ============================================================================
// API Response Structures
// ============================================================================

/// Response from /symbol_search
#[derive(Debug, Deserialize)]
struct SymbolSearchResponse {
    #[serde(default)]
    data: Vec<SymbolItem>,
    /// "ok" or "error"
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SymbolItem {
    symbol: String,
    #[serde(default)]
    instrument_name: Option<String>,
    #[serde(default)]
    exchange: Option<String>,
    #[serde(default)]
    instrument_type: Option<String>,
    #[serde(default)]
    country: Option<String>,
    #[serde(default)]
    currency: Option<String>,
    // Note: mic_code and exchange_timezone exist but are not used
}

// ============================================================================
// TwelveDataProvider
// ============================================================================

/// Twelve Data search provider.
///
/// Second networked source, consulted when FMP fails or returns too few
/// matches.
pub struct TwelveDataProvider {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl TwelveDataProvider {
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
        let url = format!("{}/symbol_search", self.base_url);
        let output_size = limit.clamp(1, MAX_OUTPUT_SIZE).to_string();
        let params = [
            ("symbol", query),
            ("outputsize", output_size.as_str()),
            ("apikey", api_key),
        ];

        let text = get_text(&self.client, PROVIDER_ID, &url, &params).await?;
        let results = parse_search_response(&text)?;

        debug!(
            "Twelve Data: found {} search results for '{}'",
            results.len(),
            query
        );
        Ok(results)
    }
}

#[async_trait]
impl SearchProvider for TwelveDataProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn priority(&self) -> u8 {
        2
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
    let response: SymbolSearchResponse = parse_json(PROVIDER_ID, body)?;

    if let Some(status) = response.status.as_deref() {
        if !status.eq_ignore_ascii_case("ok") {
            let message = response
                .message
                .unwrap_or_else(|| format!("status '{}'", status));
            return Err(MarketDataError::provider_error(PROVIDER_ID, message));
        }
    }

    Ok(response.data.into_iter().map(map_item).collect())
}

fn map_item(item: SymbolItem) -> SearchResult {
    let exchange = item.exchange.unwrap_or_default();
    let symbol = qualify_symbol(&item.symbol, &exchange);
    let name = item.instrument_name.unwrap_or_else(|| item.symbol.clone());

    let mut result = SearchResult::new(symbol, name, exchange);
    result.currency = item.currency.filter(|c| !c.is_empty());
    result.asset_type = item.instrument_type.filter(|t| !t.is_empty());
    result.country = item.country.filter(|c| !c.is_empty());
    result
}

/// Append the exchange suffix used by the other sources for Indian listings.
fn qualify_symbol(symbol: &str, exchange: &str) -> String {
    let suffix = match exchange.to_ascii_uppercase().as_str() {
        "NSE" => ".NS",
        "BSE" => ".BO",
        _ => return symbol.to_string(),
    };

    if symbol.ends_with(suffix) {
        symbol.to_string()
    } else {
        format!("{}{}", symbol, suffix)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::Query, routing::get, Json, Router};
    use std::collections::HashMap;

    #[test]
    fn test_provider_id_and_priority() {
        let provider = TwelveDataProvider::new(Some("test_key".to_string()));
        assert_eq!(provider.id(), "TWELVE_DATA");
        assert_eq!(provider.priority(), 2);
    }

    #[test]
    fn test_qualify_symbol() {
        assert_eq!(qualify_symbol("RELIANCE", "NSE"), "RELIANCE.NS");
        assert_eq!(qualify_symbol("REL", "BSE"), "REL.BO");
        assert_eq!(qualify_symbol("REL.BO", "BSE"), "REL.BO");
        assert_eq!(qualify_symbol("AAPL", "NASDAQ"), "AAPL");
    }

    #[test]
    fn test_search_response_parsing() {
        let json = r#"{
            "data": [
                {
                    "symbol": "RELIANCE",
                    "instrument_name": "Reliance Industries Ltd",
                    "exchange": "NSE",
                    "mic_code": "XNSE",
                    "exchange_timezone": "Asia/Kolkata",
                    "instrument_type": "Common Stock",
                    "country": "India",
                    "currency": "INR"
                },
                {
                    "symbol": "RELI",
                    "instrument_name": "Reliance Global Group Inc",
                    "exchange": "NASDAQ",
                    "instrument_type": "Common Stock",
                    "country": "United States",
                    "currency": "USD"
                }
            ],
            "status": "ok"
        }"#;

        let results = parse_search_response(json).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].symbol, "RELIANCE.NS");
        assert_eq!(results[0].exchange, "NSE");
        assert_eq!(results[0].country.as_deref(), Some("India"));
        assert_eq!(results[0].asset_type.as_deref(), Some("Common Stock"));
        assert_eq!(results[1].symbol, "RELI");
    }

    #[test]
    fn test_error_status_is_provider_error() {
        let json = r#"{"code": 401, "message": "**apikey** parameter is incorrect", "status": "error"}"#;

        let result = parse_search_response(json);
        assert!(matches!(
            result,
            Err(MarketDataError::ProviderError { ref message, .. }) if message.contains("apikey")
        ));
    }

    #[tokio::test]
    async fn test_missing_key_skips_request() {
        let provider = TwelveDataProvider::new(Some("   ".to_string()))
            .with_base_url("http://127.0.0.1:9");
        let result = provider.search("RELI", 5).await;
        assert!(matches!(result, Err(MarketDataError::MissingApiKey { .. })));
    }

    #[tokio::test]
    async fn test_search_sends_symbol_and_output_size() {
        let router = Router::new().route(
            "/symbol_search",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                assert_eq!(params.get("symbol").map(String::as_str), Some("REL"));
                assert_eq!(params.get("outputsize").map(String::as_str), Some("3"));
                Json(serde_json::json!({
                    "data": [{"symbol": "REL", "instrument_name": "Reliance", "exchange": "BSE", "currency": "INR"}],
                    "status": "ok"
                }))
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        let provider = TwelveDataProvider::new(Some("secret".to_string()))
            .with_base_url(format!("http://{}", addr));
        let results = provider.search("REL", 3).await.unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].symbol, "REL.BO");
    }
}
