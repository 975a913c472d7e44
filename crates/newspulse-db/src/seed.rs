//! Synthetic engagement-event generator for exercising the trending path.

use chrono::{Duration, Utc};
use newspulse_core::{EventKind, GeoPoint};
use rand::Rng;
use sqlx::PgPool;
use uuid::Uuid;

use crate::articles::list_article_ids;
use crate::events::{insert_events_batch, NewEvent};
use crate::DbError;

const SEED_ARTICLE_POOL: i64 = 100;
const SEED_WINDOW_HOURS: i64 = 48;

/// Major-city centers that receive most synthetic traffic, so trending
/// queries near them have data to rank.
const CITY_CENTERS: &[GeoPoint] = &[
    GeoPoint {
        lat: 37.7749,
        lon: -122.4194,
    }, // San Francisco
    GeoPoint {
        lat: 40.7128,
        lon: -74.0060,
    }, // New York
    GeoPoint {
        lat: 34.0522,
        lon: -118.2437,
    }, // Los Angeles
    GeoPoint {
        lat: 51.5074,
        lon: -0.1278,
    }, // London
    GeoPoint {
        lat: 19.0760,
        lon: 72.8777,
    }, // Mumbai
    GeoPoint {
        lat: 28.7041,
        lon: 77.1025,
    }, // Delhi
];

/// Generate `num_events` synthetic engagement events attributed to `user_id`.
///
/// Kinds are weighted view 0.70 / click 0.25 / share 0.05. 70% of events land
/// within ~0.5° of a major city, the rest anywhere on the globe. Timestamps
/// spread uniformly over the trailing 48 hours so recency decay is exercised.
/// Returns the number of events inserted; zero when no articles exist.
///
/// # Errors
///
/// Returns [`DbError`] if the article scan or the batch insert fails.
pub async fn generate_events(
    pool: &PgPool,
    user_id: Uuid,
    num_events: usize,
) -> Result<usize, DbError> {
    let article_ids = list_article_ids(pool, SEED_ARTICLE_POOL).await?;
    if article_ids.is_empty() {
        return Ok(0);
    }

    let now = Utc::now();
    let mut events = Vec::with_capacity(num_events);

    {
        let mut rng = rand::rng();
        for _ in 0..num_events {
            let article_id = article_ids[rng.random_range(0..article_ids.len())];
            let kind = pick_kind(rng.random_range(0.0..1.0));
            let location = pick_location(&mut rng);
            let age_minutes = rng.random_range(0..SEED_WINDOW_HOURS * 60);
            let occurred_at = now - Duration::minutes(age_minutes);

            events.push(NewEvent {
                user_id,
                article_id,
                kind,
                occurred_at,
                location: Some(location),
            });
        }
    }

    insert_events_batch(pool, &events).await
}

fn pick_kind(roll: f64) -> EventKind {
    if roll < 0.70 {
        EventKind::View
    } else if roll < 0.95 {
        EventKind::Click
    } else {
        EventKind::Share
    }
}

fn pick_location<R: Rng>(rng: &mut R) -> GeoPoint {
    if rng.random_range(0.0..1.0) < 0.7 {
        let base = CITY_CENTERS[rng.random_range(0..CITY_CENTERS.len())];
        GeoPoint {
            lat: base.lat + rng.random_range(-0.5..0.5),
            lon: base.lon + rng.random_range(-0.5..0.5),
        }
    } else {
        GeoPoint {
            lat: rng.random_range(-90.0..90.0),
            lon: rng.random_range(-180.0..180.0),
        }
    }
}
