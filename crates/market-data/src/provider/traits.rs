//! Search provider trait definitions.

use async_trait::async_trait;

use crate::errors::MarketDataError;
use crate::models::SearchResult;

/// Trait for instrument search providers.
///
/// Implement this trait to add a new search source. The aggregator orders
/// providers by [`priority`](Self::priority) and calls them one at a time.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use tradebro_market_data::{MarketDataError, SearchProvider, SearchResult};
///
/// struct MyProvider {
///     api_key: String,
/// }
///
/// #[async_trait]
/// impl SearchProvider for MyProvider {
///     fn id(&self) -> &'static str {
///         "MY_PROVIDER"
///     }
///
///     async fn search(
///         &self,
///         query: &str,
///         limit: usize,
///     ) -> Result<Vec<SearchResult>, MarketDataError> {
///         // ... call the upstream API
///     }
/// }
/// ```
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Unique identifier for this provider.
    ///
    /// Should be a constant string like "FMP", "TWELVE_DATA", etc.
    /// Used for logging and as the provenance tag on results.
    fn id(&self) -> &'static str;

    /// Provider priority for ordering.
    ///
    /// Lower values = higher priority. Default is 10.
    fn priority(&self) -> u8 {
        10
    }

    /// Search for instruments matching the query.
    ///
    /// # Arguments
    ///
    /// * `query` - The trimmed search text (e.g., "RELI", "Apple")
    /// * `limit` - Maximum number of results the caller wants
    ///
    /// # Returns
    ///
    /// Matches in the provider's own relevance order. Providers may return
    /// more than `limit`; the aggregator truncates.
    async fn search(&self, query: &str, limit: usize)
        -> Result<Vec<SearchResult>, MarketDataError>;
}
