//! Per-article aggregation of raw engagement events.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use newspulse_core::{haversine_km, EngagementEvent, EventKind, GeoPoint};
use uuid::Uuid;

/// Hours of engagement history considered when ranking. Independent of any
/// presentation window the caller applies.
pub const ENGAGEMENT_WINDOW_HOURS: i64 = 48;

/// Aggregated engagement statistics for one article. Ephemeral: computed per
/// trending request (or read back from cache) and discarded afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedStat {
    pub view_count: u64,
    pub click_count: u64,
    pub share_count: u64,
    pub most_recent_event: DateTime<Utc>,
    pub mean_proximity: f64,
}

/// Group events by article, counting per kind and tracking recency and mean
/// proximity to `center`.
///
/// Per-event proximity is `1 / (1 + distance_km)` when a center is given and
/// the event carries a location (a zero distance yields 1.0); events without
/// a location, or aggregation without a center, contribute 1.0. Articles with
/// no events in the batch are absent from the output, never zero-scored.
#[must_use]
pub fn aggregate_events(
    events: &[EngagementEvent],
    center: Option<GeoPoint>,
) -> HashMap<Uuid, AggregatedStat> {
    struct Accumulator {
        views: u64,
        clicks: u64,
        shares: u64,
        latest: DateTime<Utc>,
        proximity_sum: f64,
        event_count: u64,
    }

    let mut grouped: HashMap<Uuid, Accumulator> = HashMap::new();

    for event in events {
        let proximity = proximity_factor(center, event.location);
        let entry = grouped.entry(event.article_id).or_insert(Accumulator {
            views: 0,
            clicks: 0,
            shares: 0,
            latest: event.occurred_at,
            proximity_sum: 0.0,
            event_count: 0,
        });

        match event.kind {
            EventKind::View => entry.views += 1,
            EventKind::Click => entry.clicks += 1,
            EventKind::Share => entry.shares += 1,
        }
        if event.occurred_at > entry.latest {
            entry.latest = event.occurred_at;
        }
        entry.proximity_sum += proximity;
        entry.event_count += 1;
    }

    grouped
        .into_iter()
        .map(|(article_id, acc)| {
            #[allow(clippy::cast_precision_loss)]
            let mean_proximity = acc.proximity_sum / acc.event_count as f64;
            (
                article_id,
                AggregatedStat {
                    view_count: acc.views,
                    click_count: acc.clicks,
                    share_count: acc.shares,
                    most_recent_event: acc.latest,
                    mean_proximity,
                },
            )
        })
        .collect()
}

fn proximity_factor(center: Option<GeoPoint>, location: Option<GeoPoint>) -> f64 {
    match (center, location) {
        (Some(center), Some(location)) => {
            let distance_km = haversine_km(center, location);
            if distance_km > 0.0 {
                1.0 / (1.0 + distance_km)
            } else {
                1.0
            }
        }
        _ => 1.0,
    }
}
