mod events;
mod news;
mod trending;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use crate::middleware::{
    enforce_rate_limit, request_id, require_bearer_auth, AuthState, RateLimitState, RequestId,
};
use crate::services::{NewsService, TrendingError, TrendingService};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub news: Arc<NewsService>,
    pub trending: Arc<TrendingService>,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    database: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" | "no_data" => StatusCode::NOT_FOUND,
            "unauthorized" => StatusCode::UNAUTHORIZED,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

/// Clamp a requested page size into the supported window.
pub(super) fn normalize_limit(limit: Option<i64>, default: i64) -> i64 {
    limit.unwrap_or(default).clamp(1, 50)
}

/// Translate a 1-based page number into a row offset.
pub(super) fn page_offset(page: Option<i64>, limit: i64) -> i64 {
    (page.unwrap_or(1).max(1) - 1) * limit
}

pub(super) fn map_db_error(request_id: String, error: &newspulse_db::DbError) -> ApiError {
    match error {
        newspulse_db::DbError::InvalidFilter(invalid) => {
            ApiError::new(request_id, "validation_error", invalid.to_string())
        }
        other => {
            tracing::error!(error = %other, "database query failed");
            ApiError::new(request_id, "internal_error", "database query failed")
        }
    }
}

pub(super) fn map_trending_error(request_id: String, error: &TrendingError) -> ApiError {
    match error {
        TrendingError::NoData => ApiError::new(
            request_id,
            "no_data",
            "no trending activity recorded near this location; try simulate-events first",
        ),
        TrendingError::Store(db_error) => map_db_error(request_id, db_error),
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-request-id"),
        ])
}

fn protected_router(auth: AuthState, rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route("/api/v1/news", get(news::list_news))
        .route("/api/v1/news/category", get(news::news_by_category))
        .route("/api/v1/news/score", get(news::news_by_score))
        .route("/api/v1/news/source", get(news::news_by_source))
        .route("/api/v1/news/search", get(news::search_news))
        .route("/api/v1/news/nearby", get(news::nearby_news))
        .route("/api/v1/news/trending", get(trending::trending_news))
        .route(
            "/api/v1/news/trending/simulate-events",
            post(trending::simulate_events),
        )
        .route("/api/v1/events", post(events::record_event))
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn_with_state(
                    rate_limit,
                    enforce_rate_limit,
                ))
                .layer(axum::middleware::from_fn_with_state(
                    auth,
                    require_bearer_auth,
                )),
        )
}

pub fn build_app(state: AppState, auth: AuthState, rate_limit: RateLimitState) -> Router {
    let public_routes = Router::new().route("/api/v1/health", get(health));

    Router::new()
        .merge(public_routes)
        .merge(protected_router(auth, rate_limit))
        .layer(
            ServiceBuilder::new()
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let meta = ResponseMeta::new(req_id.0);

    match newspulse_db::health_check(&state.pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse {
                data: HealthData {
                    status: "ok",
                    database: "ok",
                },
                meta,
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check: database unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse {
                    data: HealthData {
                        status: "degraded",
                        database: "unavailable",
                    },
                    meta,
                }),
            )
        }
    }
}

pub fn default_rate_limit_state() -> RateLimitState {
    RateLimitState::new(120, Duration::from_secs(60))
}

#[cfg(test)]
mod tests {
    use super::news::NewsData;
    use super::*;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use newspulse_cache::{DisabledCache, GeoCache};
    use newspulse_llm::{LlmError, QueryIntent, Summarizer};
    use tower::ServiceExt;

    struct StubSummarizer;

    #[async_trait]
    impl Summarizer for StubSummarizer {
        async fn summarize(&self, _text: &str) -> Result<String, LlmError> {
            Ok("stub summary".to_string())
        }

        async fn extract_intent(&self, query: &str) -> Result<QueryIntent, LlmError> {
            Ok(QueryIntent::fallback(query))
        }
    }

    /// App over a lazily-connected pool: requests that fail validation never
    /// reach the database, so no server is needed.
    fn offline_app() -> Router {
        let pool = PgPool::connect_lazy("postgres://localhost/unreachable").expect("lazy pool");
        let summarizer: Arc<dyn Summarizer> = Arc::new(StubSummarizer);
        let state = AppState {
            pool: pool.clone(),
            news: Arc::new(NewsService::new(pool.clone(), Arc::clone(&summarizer))),
            trending: Arc::new(TrendingService::new(
                pool,
                GeoCache::new(Arc::new(DisabledCache)),
                summarizer,
            )),
        };
        let auth = AuthState::from_env(true).expect("auth");
        build_app(state, auth, default_rate_limit_state())
    }

    #[test]
    fn normalize_limit_applies_defaults_and_bounds() {
        assert_eq!(normalize_limit(None, 5), 5);
        assert_eq!(normalize_limit(None, 10), 10);
        assert_eq!(normalize_limit(Some(0), 5), 1);
        assert_eq!(normalize_limit(Some(1_000), 5), 50);
        assert_eq!(normalize_limit(Some(25), 5), 25);
    }

    #[test]
    fn page_offset_is_zero_based_from_one_based_pages() {
        assert_eq!(page_offset(None, 10), 0);
        assert_eq!(page_offset(Some(1), 10), 0);
        assert_eq!(page_offset(Some(3), 10), 20);
        assert_eq!(page_offset(Some(0), 10), 0);
        assert_eq!(page_offset(Some(-4), 10), 0);
    }

    #[test]
    fn api_error_validation_error_maps_to_bad_request() {
        let response = ApiError::new("req-1", "validation_error", "invalid input").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn api_error_no_data_maps_to_not_found() {
        let response = ApiError::new("req-1", "no_data", "nothing here").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn api_error_unknown_code_maps_to_internal_error() {
        let response = ApiError::new("req-1", "mystery", "boom").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn invalid_filter_maps_to_validation_error() {
        let error = newspulse_db::DbError::InvalidFilter(
            newspulse_db::InvalidFilter::NonPositiveRadius(-1.0),
        );
        let api_error = map_db_error("req-1".to_string(), &error);
        assert_eq!(api_error.error.code, "validation_error");
    }

    #[test]
    fn trending_no_data_maps_to_no_data_code() {
        let api_error = map_trending_error("req-1".to_string(), &TrendingError::NoData);
        assert_eq!(api_error.error.code, "no_data");
    }

    #[test]
    fn news_data_is_serializable() {
        let data = NewsData {
            articles: Vec::new(),
            total: 0,
            page: 1,
            page_size: 5,
        };
        let json = serde_json::to_string(&data).expect("serialize");
        assert!(json.contains("\"total\":0"));
        assert!(json.contains("\"page_size\":5"));
    }

    #[tokio::test]
    async fn zero_radius_nearby_request_is_rejected_without_touching_the_store() {
        let app = offline_app();
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/news/nearby?lat=37.7749&lon=-122.4194&radius=0")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json: serde_json::Value = serde_json::from_slice(&body).expect("json parse");
        assert_eq!(json["error"]["code"].as_str(), Some("validation_error"));
        assert!(json["meta"]["request_id"].is_string());
    }

    #[tokio::test]
    async fn invalid_event_kind_is_rejected_without_touching_the_store() {
        let app = offline_app();
        let body = serde_json::json!({
            "user_id": "5f2e7a3c-95f4-4fc7-bd45-2f5d8a3c9e10",
            "article_id": "6a1b8c4d-1234-4fc7-bd45-2f5d8a3c9e10",
            "event_kind": "bookmark"
        });
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/events")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn responses_carry_the_inbound_request_id() {
        let app = offline_app();
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/news/nearby?lat=1&lon=2&radius=-5")
                    .header("x-request-id", "trace-me-123")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(
            response.headers().get("x-request-id").map(|v| v.to_str().unwrap()),
            Some("trace-me-123")
        );
    }
}
