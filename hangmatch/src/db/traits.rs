use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::{
    IntentSession, MatchRecord, MatchStatus, ProfileSnapshot, UserInterest, UserLocation,
};

// ---------------------------------------------------------------------------
// Individual store traits
// ---------------------------------------------------------------------------

/// Read and lifecycle operations for intent sessions.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn create_session(&self, session: &IntentSession) -> Result<()>;
    async fn get_session_by_id(&self, id: &str) -> Result<Option<IntentSession>>;
    /// The candidate pool: every other user's active, unexpired session.
    async fn get_active_sessions_excluding(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<IntentSession>>;
    /// One live intent per user: clears `is_active` on all of a user's sessions.
    async fn deactivate_sessions_for_user(&self, user_id: &str) -> Result<u64>;
    /// Expiry sweep: clears `is_active` on sessions past `expires_at`.
    async fn deactivate_expired_sessions(&self, now: DateTime<Utc>) -> Result<u64>;
}

/// Read-only profile, location, and interest lookups.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get_profile(&self, user_id: &str) -> Result<Option<ProfileSnapshot>>;
    async fn get_locations(&self, user_id: &str) -> Result<Vec<UserLocation>>;
    async fn get_interests(&self, user_id: &str) -> Result<Vec<UserInterest>>;
}

/// Accepted-friend lookups.
#[async_trait]
pub trait FriendshipStore: Send + Sync {
    /// Counterparts of every accepted edge touching `user_id`, either side.
    async fn get_accepted_friend_ids(&self, user_id: &str) -> Result<Vec<String>>;
}

/// Persistence for match records.
#[async_trait]
pub trait MatchStore: Send + Sync {
    async fn create_match(&self, record: &MatchRecord) -> Result<()>;
    async fn get_match_by_id(&self, id: &str) -> Result<Option<MatchRecord>>;
    async fn list_matches_for_session(&self, session_id: &str) -> Result<Vec<MatchRecord>>;
    async fn update_match_status(&self, id: &str, status: MatchStatus) -> Result<bool>;
}

/// Combined backend trait the engine and API layers depend on.
#[async_trait]
pub trait DatabaseBackend:
    SessionStore + ProfileStore + FriendshipStore + MatchStore + Send + Sync
{
    /// Connectivity probe for health checks.
    async fn ping(&self) -> Result<()>;
}
