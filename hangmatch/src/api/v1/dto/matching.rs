//! Matching request/response DTOs for the v1 API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::matching::MatchRunOutcome;
use crate::models::{MatchRecord, MatchStatus, ScoreBreakdown, Venue};

// ---------------------------------------------------------------------------
// Request DTOs
// ---------------------------------------------------------------------------

/// Request body for `POST /v1/matches:find`.
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FindMatchesRequest {
    /// The requester's active intent session.
    pub session_id: String,
}

// ---------------------------------------------------------------------------
// Response DTOs
// ---------------------------------------------------------------------------

/// One persisted match as returned by every match endpoint.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MatchResponse {
    /// Unique match ID (nanoid, 21 chars).
    pub match_id: String,
    pub session_id: String,
    pub user_id: String,
    pub matched_user_id: String,
    pub matched_session_id: String,
    /// Rounded weighted total in `0..=100`.
    pub match_score: i64,
    pub score_breakdown: ScoreBreakdown,
    /// Venue suggestions shared by every match of the same run.
    pub suggested_venues: Vec<Venue>,
    pub status: MatchStatus,
    #[schema(value_type = String)]
    pub created_at: DateTime<Utc>,
}

impl From<MatchRecord> for MatchResponse {
    fn from(record: MatchRecord) -> Self {
        Self {
            match_id: record.id,
            session_id: record.session_id,
            user_id: record.user_id,
            matched_user_id: record.matched_user_id,
            matched_session_id: record.matched_session_id,
            match_score: record.match_score,
            score_breakdown: record.score_breakdown,
            suggested_venues: record.suggested_venues,
            status: record.status,
            created_at: record.created_at,
        }
    }
}

/// Response body for `POST /v1/matches:find`.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FindMatchesResponse {
    pub session_id: String,
    /// Ranked best-first, at most the configured top-k.
    pub matches: Vec<MatchResponse>,
    /// Venue suggestions for the run; empty when the search collaborator is
    /// unconfigured or failed.
    pub venues: Vec<Venue>,
    /// Size of the candidate pool before gating.
    pub candidates_considered: usize,
    /// How many match records were actually written.
    pub persisted: usize,
}

impl From<MatchRunOutcome> for FindMatchesResponse {
    fn from(outcome: MatchRunOutcome) -> Self {
        Self {
            session_id: outcome.session_id,
            matches: outcome.matches.into_iter().map(MatchResponse::from).collect(),
            venues: outcome.venues,
            candidates_considered: outcome.candidates_considered,
            persisted: outcome.persisted,
        }
    }
}

/// Response body for `GET /v1/sessions/{sessionId}/matches`.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListMatchesResponse {
    pub matches: Vec<MatchResponse>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn match_response_serializes_camel_case() {
        let response = MatchResponse::from(MatchRecord {
            id: "m1".to_string(),
            session_id: "s1".to_string(),
            user_id: "alice".to_string(),
            matched_user_id: "bob".to_string(),
            matched_session_id: "s2".to_string(),
            match_score: 58,
            score_breakdown: ScoreBreakdown {
                location: 0,
                mood: 100,
                time: 100,
                activity: 50,
                friend: 0,
            },
            suggested_venues: vec![],
            status: MatchStatus::Suggested,
            created_at: Utc::now(),
        });
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["matchId"], "m1");
        assert_eq!(json["matchedUserId"], "bob");
        assert_eq!(json["matchScore"], 58);
        assert_eq!(json["status"], "suggested");
        assert_eq!(json["scoreBreakdown"]["mood"], 100);
    }
}
