//! Engagement event writes and windowed scans.

use chrono::{DateTime, Utc};
use newspulse_core::{EngagementEvent, EventKind, GeoPoint};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// Spatial constraint for a windowed event scan.
#[derive(Debug, Clone, Copy)]
pub struct SpatialBound {
    pub center: GeoPoint,
    pub radius_km: f64,
}

/// An event to append, with an explicit timestamp.
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub user_id: Uuid,
    pub article_id: Uuid,
    pub kind: EventKind,
    pub occurred_at: DateTime<Utc>,
    pub location: Option<GeoPoint>,
}

#[derive(Debug, sqlx::FromRow)]
struct EventRow {
    user_id: Uuid,
    article_id: Uuid,
    event_kind: String,
    occurred_at: DateTime<Utc>,
    latitude: Option<f64>,
    longitude: Option<f64>,
}

impl TryFrom<EventRow> for EngagementEvent {
    type Error = DbError;

    fn try_from(row: EventRow) -> Result<Self, Self::Error> {
        let kind: EventKind = row
            .event_kind
            .parse()
            .map_err(|e| DbError::Decode(format!("event_kind: {e}")))?;

        let location = match (row.latitude, row.longitude) {
            (Some(lat), Some(lon)) => Some(GeoPoint { lat, lon }),
            _ => None,
        };

        Ok(EngagementEvent {
            user_id: row.user_id,
            article_id: row.article_id,
            kind,
            occurred_at: row.occurred_at,
            location,
        })
    }
}

/// Append a single engagement event, timestamped by the database.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] when the article does not exist and
/// [`DbError::Sqlx`] on any other query failure.
pub async fn insert_event(
    pool: &PgPool,
    user_id: Uuid,
    article_id: Uuid,
    kind: EventKind,
    location: Option<GeoPoint>,
) -> Result<(), DbError> {
    let result = match location {
        Some(point) => {
            sqlx::query(
                "INSERT INTO engagement_events (user_id, article_id, event_kind, user_location) \
                 VALUES ($1, $2, $3, ST_SetSRID(ST_MakePoint($4, $5), 4326)::geography)",
            )
            .bind(user_id)
            .bind(article_id)
            .bind(kind.as_str())
            .bind(point.lon)
            .bind(point.lat)
            .execute(pool)
            .await
        }
        None => {
            sqlx::query(
                "INSERT INTO engagement_events (user_id, article_id, event_kind) \
                 VALUES ($1, $2, $3)",
            )
            .bind(user_id)
            .bind(article_id)
            .bind(kind.as_str())
            .execute(pool)
            .await
        }
    };

    result.map_err(map_fk_violation)?;
    Ok(())
}

/// Append a batch of events inside one transaction.
///
/// Returns the number of events inserted. An empty batch is a no-op.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any insert fails; the whole batch rolls back.
pub async fn insert_events_batch(pool: &PgPool, events: &[NewEvent]) -> Result<usize, DbError> {
    if events.is_empty() {
        return Ok(0);
    }

    let mut tx = pool.begin().await?;

    for event in events {
        match event.location {
            Some(point) => {
                sqlx::query(
                    "INSERT INTO engagement_events \
                     (user_id, article_id, event_kind, occurred_at, user_location) \
                     VALUES ($1, $2, $3, $4, ST_SetSRID(ST_MakePoint($5, $6), 4326)::geography)",
                )
                .bind(event.user_id)
                .bind(event.article_id)
                .bind(event.kind.as_str())
                .bind(event.occurred_at)
                .bind(point.lon)
                .bind(point.lat)
                .execute(&mut *tx)
                .await?;
            }
            None => {
                sqlx::query(
                    "INSERT INTO engagement_events \
                     (user_id, article_id, event_kind, occurred_at) \
                     VALUES ($1, $2, $3, $4)",
                )
                .bind(event.user_id)
                .bind(event.article_id)
                .bind(event.kind.as_str())
                .bind(event.occurred_at)
                .execute(&mut *tx)
                .await?;
            }
        }
    }

    tx.commit().await?;
    Ok(events.len())
}

/// Scan events with `occurred_at` inside the trailing window, optionally
/// constrained to a radius around a center point.
///
/// Event locations are decoded back to lat/lon; rows with an unknown event
/// kind fail the whole scan rather than being silently dropped.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] on query failure and [`DbError::Decode`] on an
/// unrecognized event kind.
pub async fn fetch_events_window(
    pool: &PgPool,
    window_hours: i64,
    bound: Option<SpatialBound>,
) -> Result<Vec<EngagementEvent>, DbError> {
    let hours = i32::try_from(window_hours)
        .map_err(|_| DbError::Decode(format!("window_hours out of range: {window_hours}")))?;

    let rows = match bound {
        Some(SpatialBound { center, radius_km }) => {
            sqlx::query_as::<_, EventRow>(
                "SELECT user_id, article_id, event_kind, occurred_at, \
                        ST_Y(user_location::geometry) AS latitude, \
                        ST_X(user_location::geometry) AS longitude \
                 FROM engagement_events \
                 WHERE occurred_at >= NOW() - make_interval(hours => $1) \
                   AND ST_DWithin(user_location, \
                                  ST_SetSRID(ST_MakePoint($2, $3), 4326)::geography, $4)",
            )
            .bind(hours)
            .bind(center.lon)
            .bind(center.lat)
            .bind(radius_km * 1000.0)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, EventRow>(
                "SELECT user_id, article_id, event_kind, occurred_at, \
                        ST_Y(user_location::geometry) AS latitude, \
                        ST_X(user_location::geometry) AS longitude \
                 FROM engagement_events \
                 WHERE occurred_at >= NOW() - make_interval(hours => $1)",
            )
            .bind(hours)
            .fetch_all(pool)
            .await?
        }
    };

    rows.into_iter().map(EngagementEvent::try_from).collect()
}

fn map_fk_violation(error: sqlx::Error) -> DbError {
    if let sqlx::Error::Database(db_error) = &error {
        if db_error.is_foreign_key_violation() {
            return DbError::NotFound;
        }
    }
    DbError::Sqlx(error)
}
