//! Engagement aggregation and trending-score ranking.
//!
//! Pure functions over in-memory event batches; all I/O stays in the
//! calling service. The pipeline is aggregate → score → rank, with the
//! article-metadata join and cache handled by the caller.

mod aggregate;
mod scorer;

pub use aggregate::{aggregate_events, AggregatedStat, ENGAGEMENT_WINDOW_HOURS};
pub use scorer::{rank, trending_score, RankedId, CLICK_WEIGHT, SHARE_WEIGHT, VIEW_WEIGHT};
