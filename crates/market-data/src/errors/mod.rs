//! Error types for the market data crate.
//!
//! Provider errors never escape the [`SearchAggregator`](crate::SearchAggregator):
//! it logs them and moves on to the next provider. They are returned as-is
//! by the individual [`SearchProvider`](crate::SearchProvider) implementations.

use thiserror::Error;

/// Errors that can occur while querying a search provider.
#[derive(Error, Debug)]
pub enum MarketDataError {
    /// The provider needs an API key and none was configured.
    /// The provider is skipped without making a request.
    #[error("Missing API key: {provider}")]
    MissingApiKey {
        /// The provider lacking a key
        provider: String,
    },

    /// The provider rate limited the request (HTTP 429, or quota exhausted).
    #[error("Rate limited: {provider}")]
    RateLimited {
        /// The provider that rate limited the request
        provider: String,
    },

    /// The request to the provider timed out.
    #[error("Timeout: {provider}")]
    Timeout {
        /// The provider that timed out
        provider: String,
    },

    /// The provider answered with an error status or an unusable payload.
    #[error("Provider error: {provider} - {message}")]
    ProviderError {
        /// The provider that returned the error
        provider: String,
        /// The error message from the provider
        message: String,
    },

    /// The provider could not be reached (connection refused, DNS, TLS, reset).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl MarketDataError {
    /// Whether the error comes from missing configuration rather than a
    /// failed request. These are expected in keyless deployments and are
    /// logged quietly.
    pub fn is_configuration_error(&self) -> bool {
        matches!(self, Self::MissingApiKey { .. })
    }

    pub(crate) fn provider_error(provider: &str, message: impl Into<String>) -> Self {
        Self::ProviderError {
            provider: provider.to_string(),
            message: message.into(),
        }
    }
}
