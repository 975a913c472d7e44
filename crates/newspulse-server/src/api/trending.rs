//! Trending endpoints: the cached geo-ranked feed and the synthetic event
//! seeder used to exercise it.

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use newspulse_core::Article;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::middleware::RequestId;
use crate::services::DEFAULT_TRENDING_RADIUS_KM;

use super::{map_trending_error, normalize_limit, ApiError, ApiResponse, AppState, ResponseMeta};

const DEFAULT_TRENDING_LIMIT: i64 = 10;
const DEFAULT_SIMULATED_EVENTS: usize = 500;
const MAX_SIMULATED_EVENTS: usize = 5_000;

#[derive(Debug, Deserialize)]
pub(in crate::api) struct TrendingQuery {
    lat: f64,
    lon: f64,
    radius: Option<f64>,
    limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(in crate::api) struct TrendingData {
    pub articles: Vec<Article>,
    pub total: usize,
}

#[derive(Debug, Deserialize)]
pub(in crate::api) struct SimulateQuery {
    num_events: Option<usize>,
    user_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub(in crate::api) struct SimulateData {
    pub inserted: usize,
    pub user_id: Uuid,
}

/// GET /api/v1/news/trending: ranked articles near a point, cache-aside
/// with a geohash-bucketed key. 404 `no_data` when no qualifying events.
pub(in crate::api) async fn trending_news(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<TrendingQuery>,
) -> Result<Json<ApiResponse<TrendingData>>, ApiError> {
    let limit = normalize_limit(query.limit, DEFAULT_TRENDING_LIMIT);
    let radius_km = query.radius.unwrap_or(DEFAULT_TRENDING_RADIUS_KM);

    #[allow(clippy::cast_sign_loss)]
    let articles = state
        .trending
        .trending_near(query.lat, query.lon, radius_km, limit as usize)
        .await
        .map_err(|e| map_trending_error(req_id.0.clone(), &e))?;

    let total = articles.len();
    Ok(Json(ApiResponse {
        data: TrendingData { articles, total },
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// POST /api/v1/news/trending/simulate-events: generate synthetic
/// engagement so the trending feed has data to rank.
pub(in crate::api) async fn simulate_events(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<SimulateQuery>,
) -> Result<Json<ApiResponse<SimulateData>>, ApiError> {
    let num_events = query
        .num_events
        .unwrap_or(DEFAULT_SIMULATED_EVENTS)
        .min(MAX_SIMULATED_EVENTS);
    let user_id = query.user_id.unwrap_or_else(Uuid::new_v4);

    let inserted = state
        .trending
        .simulate_events(user_id, num_events)
        .await
        .map_err(|e| super::map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: SimulateData { inserted, user_id },
        meta: ResponseMeta::new(req_id.0),
    }))
}
