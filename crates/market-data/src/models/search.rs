//! Search result models for symbol lookup.

use serde::{Deserialize, Serialize};

use super::ProviderId;

/// Result from a ticker/symbol search.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    /// Exchange-qualified symbol (e.g., "RELIANCE.NS", "AAPL")
    pub symbol: String,

    /// Display name (e.g., "Reliance Industries Ltd")
    pub name: String,

    /// Exchange short name (e.g., "NSE", "NASDAQ")
    pub exchange: String,

    /// Trading currency (e.g., "INR", "USD")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,

    /// Instrument type (e.g., "Common Stock", "ETF")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,

    /// Provider that produced this entry. Set by the aggregator.
    #[serde(default)]
    pub source: ProviderId,
}

impl SearchResult {
    /// Create a new search result with required fields.
    pub fn new(
        symbol: impl Into<String>,
        name: impl Into<String>,
        exchange: impl Into<String>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            name: name.into(),
            exchange: exchange.into(),
            currency: None,
            asset_type: None,
            sector: None,
            country: None,
            source: ProviderId::Borrowed(""),
        }
    }

    /// Set the currency.
    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = Some(currency.into());
        self
    }

    /// Set the instrument type.
    pub fn with_asset_type(mut self, asset_type: impl Into<String>) -> Self {
        self.asset_type = Some(asset_type.into());
        self
    }

    /// Set the sector.
    pub fn with_sector(mut self, sector: impl Into<String>) -> Self {
        self.sector = Some(sector.into());
        self
    }

    /// Set the country.
    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    /// Tag the result with the provider that produced it.
    pub fn with_source(mut self, source: impl Into<ProviderId>) -> Self {
        self.source = source.into();
        self
    }
}
