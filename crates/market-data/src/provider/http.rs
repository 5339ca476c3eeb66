//! HTTP plumbing shared by the networked providers.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::errors::MarketDataError;

/// Timeout applied by the HTTP client itself. The aggregator enforces its own,
/// usually shorter, per-provider bound on top of this.
pub(crate) const CLIENT_TIMEOUT: Duration = Duration::from_secs(10);

pub(crate) fn build_client() -> Client {
    Client::builder()
        .timeout(CLIENT_TIMEOUT)
        .build()
        .unwrap_or_else(|_| Client::new())
}

/// Return the API key, or `MissingApiKey` when it is absent or blank.
pub(crate) fn require_key<'a>(
    provider: &str,
    api_key: Option<&'a str>,
) -> Result<&'a str, MarketDataError> {
    api_key
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .ok_or_else(|| MarketDataError::MissingApiKey {
            provider: provider.to_string(),
        })
}

/// Make a GET request and return the body of a successful response.
pub(crate) async fn get_text(
    client: &Client,
    provider: &str,
    url: &str,
    params: &[(&str, &str)],
) -> Result<String, MarketDataError> {
    debug!("{} request: {} with {} params", provider, url, params.len());

    let response = client
        .get(url)
        .query(params)
        .send()
        .await
        .map_err(|e| transport_error(provider, e))?;

    let status = response.status();

    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(MarketDataError::RateLimited {
            provider: provider.to_string(),
        });
    }

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(MarketDataError::provider_error(
            provider,
            "Invalid or missing API key",
        ));
    }

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(MarketDataError::provider_error(
            provider,
            format!("HTTP {} - {}", status, truncate(&body, 200)),
        ));
    }

    response
        .text()
        .await
        .map_err(|e| transport_error(provider, e))
}

/// Timeouts are reported per provider; anything else is a network failure.
fn transport_error(provider: &str, error: reqwest::Error) -> MarketDataError {
    if error.is_timeout() {
        MarketDataError::Timeout {
            provider: provider.to_string(),
        }
    } else {
        MarketDataError::Network(error)
    }
}

/// Parse a JSON body, mapping failures to `ProviderError`.
pub(crate) fn parse_json<T: DeserializeOwned>(
    provider: &str,
    body: &str,
) -> Result<T, MarketDataError> {
    serde_json::from_str(body).map_err(|e| {
        MarketDataError::provider_error(provider, format!("Failed to parse search response: {}", e))
    })
}

fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
