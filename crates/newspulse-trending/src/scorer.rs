//! Weighted, decayed trending score and deterministic ranking.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::aggregate::AggregatedStat;

pub const VIEW_WEIGHT: f64 = 1.0;
pub const CLICK_WEIGHT: f64 = 3.0;
pub const SHARE_WEIGHT: f64 = 5.0;

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// Ranking entry: score plus the tie-break fields.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedId {
    pub article_id: Uuid,
    pub score: f64,
    pub most_recent_event: DateTime<Utc>,
}

/// Score one article's aggregated stats at `now`.
///
/// `score = (views·1 + clicks·3 + shares·5) × 1/(1 + Δh) × mean_proximity`
/// where Δh is the whole-and-fractional hours since the most recent event,
/// clamped at zero for clock skew.
#[must_use]
pub fn trending_score(stat: &AggregatedStat, now: DateTime<Utc>) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let engagement = stat.view_count as f64 * VIEW_WEIGHT
        + stat.click_count as f64 * CLICK_WEIGHT
        + stat.share_count as f64 * SHARE_WEIGHT;

    #[allow(clippy::cast_precision_loss)]
    let hours_since = ((now - stat.most_recent_event).num_milliseconds() as f64 / MILLIS_PER_HOUR)
        .max(0.0);

    engagement * (1.0 / (1.0 + hours_since)) * stat.mean_proximity
}

/// Rank articles by trending score, descending, truncated to `limit`.
///
/// Ties break by most-recent-event time descending, then article id
/// ascending, so the ordering is total and deterministic.
#[must_use]
pub fn rank(
    stats: &HashMap<Uuid, AggregatedStat>,
    now: DateTime<Utc>,
    limit: usize,
) -> Vec<RankedId> {
    let mut ranked: Vec<RankedId> = stats
        .iter()
        .map(|(article_id, stat)| RankedId {
            article_id: *article_id,
            score: trending_score(stat, now),
            most_recent_event: stat.most_recent_event,
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| b.most_recent_event.cmp(&a.most_recent_event))
            .then_with(|| a.article_id.cmp(&b.article_id))
    });
    ranked.truncate(limit);
    ranked
}
