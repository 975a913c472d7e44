//! News retrieval endpoints: unified multi-filter listing plus the
//! single-filter convenience routes, free-text search, and nearby lookup.

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use newspulse_core::Article;
use newspulse_db::{ArticleFilter, Page};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;
use crate::services::NewsPage;

use super::{map_db_error, normalize_limit, page_offset, ApiError, ApiResponse, AppState, ResponseMeta};

const DEFAULT_PAGE_SIZE: i64 = 5;
const DEFAULT_NEARBY_RADIUS_KM: f64 = 10.0;

#[derive(Debug, Serialize)]
pub(in crate::api) struct NewsData {
    pub articles: Vec<Article>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
}

#[derive(Debug, Deserialize)]
pub(in crate::api) struct ListNewsQuery {
    category: Option<String>,
    min_score: Option<f64>,
    source_name: Option<String>,
    page: Option<i64>,
    limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub(in crate::api) struct CategoryQuery {
    category: String,
    page: Option<i64>,
    limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub(in crate::api) struct ScoreQuery {
    min_score: Option<f64>,
    page: Option<i64>,
    limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub(in crate::api) struct SourceQuery {
    source_name: String,
    page: Option<i64>,
    limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub(in crate::api) struct SearchQuery {
    query: String,
    category: Option<String>,
    min_score: Option<f64>,
    page: Option<i64>,
    limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub(in crate::api) struct NearbyQuery {
    lat: f64,
    lon: f64,
    radius: Option<f64>,
    category: Option<String>,
    page: Option<i64>,
    limit: Option<i64>,
}

fn news_response(
    req_id: String,
    result: NewsPage,
    page: Option<i64>,
    limit: i64,
) -> Json<ApiResponse<NewsData>> {
    Json(ApiResponse {
        data: NewsData {
            articles: result.articles,
            total: result.total,
            page: page.unwrap_or(1).max(1),
            page_size: limit,
        },
        meta: ResponseMeta::new(req_id),
    })
}

/// GET /api/v1/news: all filters optional, combined with AND.
pub(in crate::api) async fn list_news(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ListNewsQuery>,
) -> Result<Json<ApiResponse<NewsData>>, ApiError> {
    let limit = normalize_limit(query.limit, DEFAULT_PAGE_SIZE);
    let filter = ArticleFilter {
        category: query.category,
        min_score: query.min_score,
        source_name: query.source_name,
        ..ArticleFilter::default()
    };

    let result = state
        .news
        .fetch(
            &filter,
            Page {
                limit,
                offset: page_offset(query.page, limit),
            },
        )
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(news_response(req_id.0, result, query.page, limit))
}

/// GET /api/v1/news/category: array-membership category match.
pub(in crate::api) async fn news_by_category(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<CategoryQuery>,
) -> Result<Json<ApiResponse<NewsData>>, ApiError> {
    let limit = normalize_limit(query.limit, DEFAULT_PAGE_SIZE);
    let filter = ArticleFilter {
        category: Some(query.category),
        ..ArticleFilter::default()
    };

    let result = state
        .news
        .fetch(
            &filter,
            Page {
                limit,
                offset: page_offset(query.page, limit),
            },
        )
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(news_response(req_id.0, result, query.page, limit))
}

/// GET /api/v1/news/score: inclusive relevance floor, best first.
pub(in crate::api) async fn news_by_score(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ScoreQuery>,
) -> Result<Json<ApiResponse<NewsData>>, ApiError> {
    let limit = normalize_limit(query.limit, DEFAULT_PAGE_SIZE);
    let filter = ArticleFilter {
        min_score: Some(query.min_score.unwrap_or(0.7)),
        ..ArticleFilter::default()
    };

    let result = state
        .news
        .fetch(
            &filter,
            Page {
                limit,
                offset: page_offset(query.page, limit),
            },
        )
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(news_response(req_id.0, result, query.page, limit))
}

/// GET /api/v1/news/source: case-insensitive substring source match.
pub(in crate::api) async fn news_by_source(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<SourceQuery>,
) -> Result<Json<ApiResponse<NewsData>>, ApiError> {
    let limit = normalize_limit(query.limit, DEFAULT_PAGE_SIZE);
    let filter = ArticleFilter {
        source_name: Some(query.source_name),
        ..ArticleFilter::default()
    };

    let result = state
        .news
        .fetch(
            &filter,
            Page {
                limit,
                offset: page_offset(query.page, limit),
            },
        )
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(news_response(req_id.0, result, query.page, limit))
}

/// GET /api/v1/news/search: intent-extracted full-text search.
pub(in crate::api) async fn search_news(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<ApiResponse<NewsData>>, ApiError> {
    let limit = normalize_limit(query.limit, DEFAULT_PAGE_SIZE);

    let result = state
        .news
        .search(
            &query.query,
            query.category,
            query.min_score,
            Page {
                limit,
                offset: page_offset(query.page, limit),
            },
        )
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(news_response(req_id.0, result, query.page, limit))
}

/// GET /api/v1/news/nearby: articles within a radius, closest first.
pub(in crate::api) async fn nearby_news(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<NearbyQuery>,
) -> Result<Json<ApiResponse<NewsData>>, ApiError> {
    let limit = normalize_limit(query.limit, DEFAULT_PAGE_SIZE);
    let radius_km = query.radius.unwrap_or(DEFAULT_NEARBY_RADIUS_KM);

    let result = state
        .news
        .nearby(
            query.lat,
            query.lon,
            radius_km,
            query.category,
            Page {
                limit,
                offset: page_offset(query.page, limit),
            },
        )
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(news_response(req_id.0, result, query.page, limit))
}
