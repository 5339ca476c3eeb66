use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tradebro_cache::CacheStats;

use crate::{
    error::{ApiError, ApiResult},
    main_lib::AppState,
};

#[derive(Serialize)]
struct StatsResponse {
    success: bool,
    stats: CacheStats,
}

#[derive(Serialize)]
struct ClearResponse {
    success: bool,
}

async fn get_cache_stats(State(state): State<Arc<AppState>>) -> Json<StatsResponse> {
    state.cache.ping().await;
    Json(StatsResponse {
        success: true,
        stats: state.cache.stats(),
    })
}

async fn clear_cache(State(state): State<Arc<AppState>>) -> ApiResult<Json<ClearResponse>> {
    if !state.cache.clear().await {
        return Err(ApiError::Internal("Cache clear failed".to_string()));
    }
    Ok(Json(ClearResponse { success: true }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/cache/stats", get(get_cache_stats))
        .route("/cache/clear", post(clear_cache))
}
