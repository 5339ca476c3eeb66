//! Multi-source instrument search.
//!
//! This module provides:
//! - [`SearchAggregator`]: runs providers in priority order and merges results
//! - [`SearchOutcome`] / [`ProviderAttempt`]: what each provider contributed

mod aggregator;
mod diagnostics;

pub use aggregator::{
    SearchAggregator, DEFAULT_LIMIT, DEFAULT_PROVIDER_TIMEOUT, MAX_LIMIT, MIN_QUERY_LEN,
};
pub use diagnostics::{AttemptStatus, ProviderAttempt, SearchOutcome};
