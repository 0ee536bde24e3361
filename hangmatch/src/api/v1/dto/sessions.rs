//! Intent session request/response DTOs for the v1 API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{HangError, Result};
use crate::models::{IntentSession, TimeWindow};

// ---------------------------------------------------------------------------
// Request DTOs
// ---------------------------------------------------------------------------

/// Request body for `POST /v1/sessions`.
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    /// Owner of the session. Opaque id issued by the identity collaborator.
    pub user_id: String,
    /// Mood label (`chill`, `deep_talk`, `explore_nyc`, `coworking`, `party`).
    /// Unknown labels are accepted and score as incompatible with everything.
    pub mood: String,
    /// Energy level in `1..=10`. Defaults to 5.
    pub energy_level: Option<i64>,
    /// Free-form activity tags, e.g. `"Coffee"`, `"Museum"`.
    #[serde(default)]
    pub activity_types: Vec<String>,
    /// Availability windows. A session with none never clears the time gate.
    #[serde(default)]
    pub time_windows: Vec<TimeWindow>,
    pub wants_to_do: Option<String>,
    pub does_not_want: Option<String>,
    /// Opaque metadata from the conversational intake; stored verbatim.
    #[schema(value_type = Object)]
    pub emotional_intent_metadata: Option<serde_json::Value>,
}

impl CreateSessionRequest {
    pub fn validate(&self) -> Result<()> {
        if self.user_id.trim().is_empty() {
            return Err(HangError::Validation("userId must not be empty".into()));
        }
        if self.mood.trim().is_empty() {
            return Err(HangError::Validation("mood must not be empty".into()));
        }
        if let Some(energy) = self.energy_level {
            if !(1..=10).contains(&energy) {
                return Err(HangError::Validation(format!(
                    "energyLevel must be between 1 and 10, got {energy}"
                )));
            }
        }
        for window in &self.time_windows {
            if window.date.trim().is_empty() {
                return Err(HangError::Validation(
                    "time window date must not be empty".into(),
                ));
            }
            if window.start >= window.end {
                return Err(HangError::Validation(format!(
                    "time window on {} must start before it ends ({} >= {})",
                    window.date, window.start, window.end
                )));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Response DTOs
// ---------------------------------------------------------------------------

/// Full session response for `GET /v1/sessions/{sessionId}`.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    /// Unique session ID (nanoid, 21 chars).
    pub session_id: String,
    pub user_id: String,
    pub mood: String,
    pub energy_level: i64,
    pub activity_types: Vec<String>,
    pub time_windows: Vec<TimeWindow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wants_to_do: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub does_not_want: Option<String>,
    /// Opaque metadata from the conversational intake, echoed verbatim.
    #[schema(value_type = Object)]
    pub emotional_intent_metadata: serde_json::Value,
    pub is_active: bool,
    #[schema(value_type = String)]
    pub created_at: DateTime<Utc>,
    #[schema(value_type = String)]
    pub expires_at: DateTime<Utc>,
}

impl From<IntentSession> for SessionResponse {
    fn from(session: IntentSession) -> Self {
        Self {
            session_id: session.id,
            user_id: session.user_id,
            mood: session.mood,
            energy_level: session.energy_level,
            activity_types: session.activity_types,
            time_windows: session.time_windows,
            wants_to_do: session.wants_to_do,
            does_not_want: session.does_not_want,
            emotional_intent_metadata: session.emotional_intent_metadata,
            is_active: session.is_active,
            created_at: session.created_at,
            expires_at: session.expires_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_request() -> CreateSessionRequest {
        CreateSessionRequest {
            user_id: "alice".to_string(),
            mood: "chill".to_string(),
            energy_level: Some(5),
            activity_types: vec!["Coffee".to_string()],
            time_windows: vec![TimeWindow {
                date: "2025-01-10".to_string(),
                start: "18:00".to_string(),
                end: "20:00".to_string(),
            }],
            wants_to_do: None,
            does_not_want: None,
            emotional_intent_metadata: None,
        }
    }

    #[test]
    fn valid_request_passes() {
        valid_request().validate().unwrap();
    }

    #[test]
    fn energy_out_of_range_is_rejected() {
        let mut req = valid_request();
        req.energy_level = Some(0);
        assert!(req.validate().is_err());
        req.energy_level = Some(11);
        assert!(req.validate().is_err());
        req.energy_level = None;
        req.validate().unwrap();
    }

    #[test]
    fn inverted_time_window_is_rejected() {
        let mut req = valid_request();
        req.time_windows[0].start = "21:00".to_string();
        assert!(req.validate().is_err());
    }

    #[test]
    fn blank_user_or_mood_is_rejected() {
        let mut req = valid_request();
        req.user_id = "  ".to_string();
        assert!(req.validate().is_err());

        let mut req = valid_request();
        req.mood = String::new();
        assert!(req.validate().is_err());
    }

    #[test]
    fn request_deserializes_camel_case() {
        let req: CreateSessionRequest = serde_json::from_value(serde_json::json!({
            "userId": "alice",
            "mood": "deep_talk",
            "energyLevel": 7,
            "timeWindows": [{"date": "2025-01-10", "start": "18:00", "end": "20:00"}]
        }))
        .unwrap();
        assert_eq!(req.user_id, "alice");
        assert_eq!(req.energy_level, Some(7));
        assert!(req.activity_types.is_empty());
    }
}
