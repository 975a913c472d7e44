//! Engagement event types.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geo::GeoPoint;
use crate::CoreError;

/// Kind of a user engagement event, ordered by increasing signal strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    View,
    Click,
    Share,
}

impl EventKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::View => "view",
            EventKind::Click => "click",
            EventKind::Share => "share",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "view" => Ok(EventKind::View),
            "click" => Ok(EventKind::Click),
            "share" => Ok(EventKind::Share),
            other => Err(CoreError::UnknownEventKind(other.to_string())),
        }
    }
}

/// A single recorded user interaction with an article. Append-only.
#[derive(Debug, Clone, PartialEq)]
pub struct EngagementEvent {
    pub user_id: Uuid,
    pub article_id: Uuid,
    pub kind: EventKind,
    pub occurred_at: DateTime<Utc>,
    pub location: Option<GeoPoint>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_kind_round_trips_through_str() {
        for kind in [EventKind::View, EventKind::Click, EventKind::Share] {
            assert_eq!(kind.as_str().parse::<EventKind>().unwrap(), kind);
        }
    }

    #[test]
    fn unknown_event_kind_is_rejected() {
        let err = "bookmark".parse::<EventKind>().unwrap_err();
        assert!(matches!(err, CoreError::UnknownEventKind(s) if s == "bookmark"));
    }

    #[test]
    fn event_kind_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&EventKind::Share).unwrap(), "\"share\"");
    }
}
