//! Engagement event recording.

use axum::{extract::State, Extension, Json};
use newspulse_core::{EventKind, GeoPoint};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(in crate::api) struct RecordEventBody {
    user_id: Uuid,
    article_id: Uuid,
    event_kind: String,
    lat: Option<f64>,
    lon: Option<f64>,
}

#[derive(Debug, Serialize)]
pub(in crate::api) struct EventAccepted {
    pub article_id: Uuid,
    pub event_kind: EventKind,
}

/// POST /api/v1/events: append one engagement event.
///
/// The location is optional but must be a complete pair when given. 404 when
/// the article does not exist.
pub(in crate::api) async fn record_event(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<RecordEventBody>,
) -> Result<Json<ApiResponse<EventAccepted>>, ApiError> {
    let kind: EventKind = body.event_kind.parse().map_err(|_| {
        ApiError::new(
            req_id.0.clone(),
            "validation_error",
            format!("unknown event_kind '{}'", body.event_kind),
        )
    })?;

    let location = match (body.lat, body.lon) {
        (Some(lat), Some(lon)) => Some(GeoPoint { lat, lon }),
        (None, None) => None,
        _ => {
            return Err(ApiError::new(
                req_id.0.clone(),
                "validation_error",
                "event location requires both lat and lon",
            ))
        }
    };

    newspulse_db::insert_event(&state.pool, body.user_id, body.article_id, kind, location)
        .await
        .map_err(|e| match e {
            newspulse_db::DbError::NotFound => {
                ApiError::new(req_id.0.clone(), "not_found", "article not found")
            }
            other => super::map_db_error(req_id.0.clone(), &other),
        })?;

    Ok(Json(ApiResponse {
        data: EventAccepted {
            article_id: body.article_id,
            event_kind: kind,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}
