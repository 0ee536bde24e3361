use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A single availability window on one calendar date.
///
/// `start` and `end` are local wall-clock times formatted `HH:MM`; the
/// interval is half-open, so `[18:00, 20:00)` and `[20:00, 22:00)` do not
/// overlap. `date` is `YYYY-MM-DD`. Both formats sort lexicographically,
/// which the overlap check relies on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct TimeWindow {
    pub date: String,
    pub start: String,
    pub end: String,
}

impl TimeWindow {
    /// Half-open interval overlap: same date, `startA < endB && startB < endA`.
    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        self.date == other.date && self.start < other.end && other.start < self.end
    }
}

/// A user's time-bounded matching intent. Read-only during a matching run;
/// never matched after `expires_at` or once `is_active` is cleared.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentSession {
    pub id: String,
    pub user_id: String,
    pub mood: String,
    pub energy_level: i64,
    pub activity_types: Vec<String>,
    pub time_windows: Vec<TimeWindow>,
    pub wants_to_do: Option<String>,
    pub does_not_want: Option<String>,
    /// Opaque blob supplied by the conversational-intent collaborator.
    /// Stored and returned verbatim; the match engine never reads it.
    pub emotional_intent_metadata: serde_json::Value,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl IntentSession {
    pub fn new(id: String, user_id: String, mood: String, ttl_hours: i64) -> Self {
        let now = Utc::now();
        Self {
            id,
            user_id,
            mood,
            energy_level: 5,
            activity_types: Vec::new(),
            time_windows: Vec::new(),
            wants_to_do: None,
            does_not_want: None,
            emotional_intent_metadata: serde_json::Value::Null,
            is_active: true,
            created_at: now,
            expires_at: now + Duration::hours(ttl_hours),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }
}
