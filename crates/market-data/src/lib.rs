//! TradeBro Market Data Crate
//!
//! Instrument search across several stock-data providers.
//!
//! # Overview
//!
//! - Networked providers: Financial Modeling Prep, Twelve Data
//! - A static local instrument list used when the network providers are
//!   unreachable or unconfigured
//! - An aggregator that runs the providers in priority order, deduplicates by
//!   symbol and stops once the requested number of results is reached
//!
//! # Architecture
//!
//! ```text
//!   query, limit
//!        |
//!        v
//! +------------------+   short query -> []
//! | SearchAggregator |
//! +------------------+
//!        |  sequential, per-provider timeout
//!        v
//!   FMP --> TWELVE_DATA --> LOCAL
//!        |
//!        v
//!   Vec<SearchResult> (deduplicated, tagged with `source`)
//! ```
//!
//! # Core Types
//!
//! - [`SearchResult`] - One instrument match, tagged with the provider that produced it
//! - [`SearchProvider`] - Trait implemented by each search source
//! - [`SearchAggregator`] - The ordered provider pipeline
//! - [`SearchOutcome`] - Results plus per-provider diagnostics

pub mod errors;
pub mod models;
pub mod provider;
pub mod search;

pub use errors::MarketDataError;
pub use models::{ProviderId, SearchResult};
pub use provider::fmp::FmpProvider;
pub use provider::local::LocalProvider;
pub use provider::twelve_data::TwelveDataProvider;
pub use provider::SearchProvider;
pub use search::{
    AttemptStatus, ProviderAttempt, SearchAggregator, SearchOutcome, DEFAULT_LIMIT,
    DEFAULT_PROVIDER_TIMEOUT, MAX_LIMIT, MIN_QUERY_LEN,
};
