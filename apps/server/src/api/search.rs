use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tradebro_market_data::{SearchResult, DEFAULT_LIMIT, MAX_LIMIT};

use crate::{
    error::{ApiError, ApiResult},
    main_lib::AppState,
};

#[derive(Deserialize)]
struct SearchQuery {
    q: Option<String>,
    limit: Option<String>,
}

impl SearchQuery {
    fn query(&self) -> &str {
        self.q.as_deref().map(str::trim).unwrap_or_default()
    }

    /// Requested limit, capped at [`MAX_LIMIT`]. A missing value means
    /// [`DEFAULT_LIMIT`]; a non-numeric one is rejected.
    fn limit(&self) -> ApiResult<usize> {
        match self.limit.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            None => Ok(DEFAULT_LIMIT),
            Some(raw) => raw
                .parse::<usize>()
                .map(|limit| limit.min(MAX_LIMIT))
                .map_err(|_| ApiError::BadRequest(format!("Invalid limit: {}", raw))),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchResponse {
    success: bool,
    results: Vec<SearchResult>,
    total: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    query: Option<String>,
}

impl SearchResponse {
    fn new(results: Vec<SearchResult>, query: Option<&str>) -> Self {
        Self {
            success: true,
            total: results.len(),
            results,
            query: query.map(str::to_string),
        }
    }
}

fn cache_key(query: &str, limit: usize) -> String {
    format!("search:{}:{}", query.to_lowercase(), limit)
}

async fn search_stocks(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchQuery>,
) -> ApiResult<Json<SearchResponse>> {
    let query = params.query();
    let limit = params.limit()?;
    let key = cache_key(query, limit);

    if let Some(cached) = state.cache.get::<Vec<SearchResult>>(&key).await {
        tracing::debug!("Search cache hit for {}", key);
        return Ok(Json(SearchResponse::new(cached, Some(query))));
    }

    let results = state.search.search(query, limit).await;
    if !results.is_empty() {
        state
            .cache
            .set(&key, &results, state.search_cache_ttl)
            .await;
    }
    Ok(Json(SearchResponse::new(results, Some(query))))
}

async fn trending(State(state): State<Arc<AppState>>) -> Json<SearchResponse> {
    Json(SearchResponse::new(state.search.trending(), None))
}

async fn suggestions(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchQuery>,
) -> ApiResult<Json<SearchResponse>> {
    let query = params.query();
    let limit = params.limit()?;
    let results = state.search.suggestions(query, limit);
    Ok(Json(SearchResponse::new(results, Some(query))))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/search/stocks", get(search_stocks))
        .route("/search/trending", get(trending))
        .route("/search/suggestions", get(suggestions))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(q: Option<&str>, limit: Option<&str>) -> SearchQuery {
        SearchQuery {
            q: q.map(str::to_string),
            limit: limit.map(str::to_string),
        }
    }

    #[test]
    fn test_limit_parsing() {
        assert_eq!(params(None, None).limit().unwrap(), DEFAULT_LIMIT);
        assert_eq!(params(None, Some(" ")).limit().unwrap(), DEFAULT_LIMIT);
        assert_eq!(params(None, Some("3")).limit().unwrap(), 3);
        assert_eq!(params(None, Some("9999")).limit().unwrap(), MAX_LIMIT);
        assert!(params(None, Some("ten")).limit().is_err());
        assert!(params(None, Some("-1")).limit().is_err());
    }

    #[test]
    fn test_query_is_trimmed() {
        assert_eq!(params(Some("  reli "), None).query(), "reli");
        assert_eq!(params(None, None).query(), "");
    }

    #[test]
    fn test_cache_key_is_case_insensitive() {
        assert_eq!(cache_key("RELI", 5), cache_key("reli", 5));
        assert_eq!(cache_key("Reli", 5), "search:reli:5");
    }
}
