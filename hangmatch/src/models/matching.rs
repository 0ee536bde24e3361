use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-dimension sub-scores, each an integer in `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ScoreBreakdown {
    pub location: i64,
    pub mood: i64,
    pub time: i64,
    pub activity: i64,
    pub friend: i64,
}

/// Ephemeral score for one (requester, candidate) pair. Lives only inside a
/// single engine run; never persisted.
#[derive(Debug, Clone)]
pub struct CandidateScore {
    pub user_id: String,
    pub session_id: String,
    pub total: f64,
    pub breakdown: ScoreBreakdown,
    pub admitted: bool,
}

/// A venue suggestion normalized from the external search collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Venue {
    pub name: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    Suggested,
    Accepted,
}

impl std::fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Suggested => write!(f, "suggested"),
            Self::Accepted => write!(f, "accepted"),
        }
    }
}

impl std::str::FromStr for MatchStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "suggested" => Ok(Self::Suggested),
            "accepted" => Ok(Self::Accepted),
            other => Err(format!("unknown match status: {other}")),
        }
    }
}

/// The persisted output of a matching run: one record per admitted candidate.
/// The engine writes records with status `suggested`; only the chat
/// collaborator transitions them to `accepted` afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchRecord {
    pub id: String,
    pub session_id: String,
    pub user_id: String,
    pub matched_user_id: String,
    pub matched_session_id: String,
    pub match_score: i64,
    pub score_breakdown: ScoreBreakdown,
    /// Shared across every record written by one run.
    pub suggested_venues: Vec<Venue>,
    pub status: MatchStatus,
    pub created_at: DateTime<Utc>,
}
