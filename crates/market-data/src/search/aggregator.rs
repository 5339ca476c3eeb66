//! Ordered provider pipeline for instrument search.
//!
//! Each provider is one step of a chain. A step either contributes results or
//! fails; failures are logged and the chain moves on. The chain stops as soon
//! as the requested number of results is reached, so lower-priority providers
//! are only called when needed. Providers run one after another, never
//! concurrently, which keeps result ordering deterministic and avoids spending
//! API quota on providers whose answers would be discarded.

use std::collections::HashSet;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tokio::time::timeout;
use tracing::{debug, error, warn};

use super::diagnostics::{AttemptStatus, ProviderAttempt, SearchOutcome};
use crate::models::SearchResult;
use crate::provider::local::LocalProvider;
use crate::provider::SearchProvider;

/// Queries shorter than this (after trimming) return no results.
pub const MIN_QUERY_LEN: usize = 2;

/// Result limit used when the caller does not specify one.
pub const DEFAULT_LIMIT: usize = 10;

/// Upper bound on the result limit.
pub const MAX_LIMIT: usize = 50;

/// Default bound on a single provider call.
pub const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(5);

/// Searches providers in priority order, deduplicating by symbol.
pub struct SearchAggregator {
    /// Every step of the chain, sorted by priority. Includes the local list.
    providers: Vec<Arc<dyn SearchProvider>>,
    local: Arc<LocalProvider>,
    provider_timeout: Duration,
}

impl SearchAggregator {
    /// Build the chain from networked providers plus the local fallback list.
    ///
    /// Providers are ordered by [`SearchProvider::priority`]; ties keep the
    /// order given. The local list always runs last.
    pub fn new(providers: Vec<Arc<dyn SearchProvider>>, local: Arc<LocalProvider>) -> Self {
        let mut providers = providers;
        providers.sort_by_key(|p| p.priority());
        let local_step: Arc<dyn SearchProvider> = local.clone();
        providers.push(local_step);

        Self {
            providers,
            local,
            provider_timeout: DEFAULT_PROVIDER_TIMEOUT,
        }
    }

    /// Set the bound on each individual provider call.
    pub fn with_provider_timeout(mut self, provider_timeout: Duration) -> Self {
        self.provider_timeout = provider_timeout;
        self
    }

    /// Provider ids in the order they are consulted.
    pub fn provider_ids(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.id()).collect()
    }

    /// Search all providers and return the merged results.
    ///
    /// Never fails: provider errors are logged and skipped, and a query
    /// shorter than [`MIN_QUERY_LEN`] yields an empty list without calling
    /// any provider.
    pub async fn search(&self, query: &str, limit: usize) -> Vec<SearchResult> {
        self.search_with_diagnostics(query, limit).await.results
    }

    /// Like [`search`](Self::search), also reporting what each provider did.
    pub async fn search_with_diagnostics(&self, query: &str, limit: usize) -> SearchOutcome {
        let query = query.trim();
        let limit = limit.min(MAX_LIMIT);
        let mut outcome = SearchOutcome::new(query);

        if !is_searchable(query) || limit == 0 {
            debug!("Search for '{}' skipped: query too short or zero limit", query);
            return outcome;
        }

        let mut seen: HashSet<String> = HashSet::new();

        for provider in &self.providers {
            if outcome.results.len() >= limit {
                break;
            }
            let attempt = self
                .run_step(provider.as_ref(), query, limit, &mut seen, &mut outcome.results)
                .await;
            debug!("Search '{}': {}", query, attempt);
            outcome.attempts.push(attempt);
        }

        debug!(
            "Search '{}' returned {} results from {} providers",
            query,
            outcome.results.len(),
            outcome.attempts.len()
        );
        outcome
    }

    /// Match against the local list only. No network provider is consulted.
    pub fn suggestions(&self, query: &str, limit: usize) -> Vec<SearchResult> {
        let query = query.trim();
        let limit = limit.min(MAX_LIMIT);
        if !is_searchable(query) || limit == 0 {
            return Vec::new();
        }
        self.local.matches(query, limit)
    }

    /// The curated trending list.
    pub fn trending(&self) -> Vec<SearchResult> {
        self.local.trending()
    }

    /// Run one provider and append its new, unseen results.
    async fn run_step(
        &self,
        provider: &dyn SearchProvider,
        query: &str,
        limit: usize,
        seen: &mut HashSet<String>,
        results: &mut Vec<SearchResult>,
    ) -> ProviderAttempt {
        let provider_id = provider.id();
        let call = timeout(self.provider_timeout, provider.search(query, limit));

        match AssertUnwindSafe(call).catch_unwind().await {
            Ok(Ok(Ok(items))) => {
                let returned = items.len();
                let mut accepted = 0;
                for item in items {
                    if results.len() >= limit {
                        break;
                    }
                    if item.symbol.trim().is_empty() || !seen.insert(item.symbol.clone()) {
                        continue;
                    }
                    results.push(item.with_source(provider_id));
                    accepted += 1;
                }
                ProviderAttempt::new(provider_id, AttemptStatus::Answered { returned, accepted })
            }
            Ok(Ok(Err(e))) if e.is_configuration_error() => {
                debug!("Provider '{}' skipped: {}", provider_id, e);
                ProviderAttempt::new(provider_id, AttemptStatus::Skipped { reason: e.to_string() })
            }
            Ok(Ok(Err(e))) => {
                warn!("Provider '{}' search failed for '{}': {}", provider_id, query, e);
                ProviderAttempt::new(provider_id, AttemptStatus::Failed { reason: e.to_string() })
            }
            Ok(Err(_elapsed)) => {
                warn!(
                    "Provider '{}' search timed out after {:?} for '{}'",
                    provider_id, self.provider_timeout, query
                );
                ProviderAttempt::new(provider_id, AttemptStatus::TimedOut)
            }
            Err(panic) => {
                error!(
                    "Provider '{}' panicked during search for '{}': {}",
                    provider_id,
                    query,
                    panic_message(panic.as_ref())
                );
                ProviderAttempt::new(provider_id, AttemptStatus::Panicked)
            }
        }
    }
}

fn is_searchable(query: &str) -> bool {
    query.chars().count() >= MIN_QUERY_LEN
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
