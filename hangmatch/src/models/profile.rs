use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Read-only per-user profile consumed by the scorers. Owned by the external
/// profile intake collaborator; this service never mutates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileSnapshot {
    pub user_id: String,
    pub display_name: Option<String>,
    pub home_neighborhood: Option<String>,
    pub preferred_neighborhoods: Vec<String>,
    pub train_routes: Vec<String>,
    pub trust_score: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProfileSnapshot {
    pub fn new(user_id: String) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            display_name: None,
            home_neighborhood: None,
            preferred_neighborhoods: Vec::new(),
            train_routes: Vec::new(),
            trust_score: 10,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A registered frequent location (office, gym, ...). Only the neighborhood
/// feeds into location scoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserLocation {
    pub id: String,
    pub user_id: String,
    pub label: Option<String>,
    pub location_type: String,
    pub neighborhood: String,
    pub borough: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInterest {
    pub id: String,
    pub user_id: String,
    pub interest: String,
    pub interest_type: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FriendshipStatus {
    Pending,
    Accepted,
    Declined,
}

impl std::fmt::Display for FriendshipStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Accepted => write!(f, "accepted"),
            Self::Declined => write!(f, "declined"),
        }
    }
}

impl std::str::FromStr for FriendshipStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "declined" => Ok(Self::Declined),
            other => Err(format!("unknown friendship status: {other}")),
        }
    }
}

/// Undirected relation between two users. Only `accepted` edges contribute
/// to the friendship bonus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FriendshipEdge {
    pub id: String,
    pub user_id: String,
    pub friend_id: String,
    pub status: FriendshipStatus,
    pub created_at: DateTime<Utc>,
}

impl FriendshipEdge {
    /// The other endpoint of the edge as seen from `user_id`.
    pub fn counterpart(&self, user_id: &str) -> &str {
        if self.user_id == user_id {
            &self.friend_id
        } else {
            &self.user_id
        }
    }
}
