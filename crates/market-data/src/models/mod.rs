//! Market data models
//!
//! This module contains the data types shared by providers and the aggregator:
//! - `types` - Type aliases for common identifiers (ProviderId)
//! - `search` - Search result data (SearchResult)

mod search;
mod types;

pub use search::SearchResult;
pub use types::ProviderId;
