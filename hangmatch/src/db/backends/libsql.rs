use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::db::connection::Database;
use crate::db::repository::{
    FriendshipRepository, MatchRepository, ProfileRepository, SessionRepository,
};
use crate::db::traits::{
    DatabaseBackend, FriendshipStore, MatchStore, ProfileStore, SessionStore,
};
use crate::error::Result;
use crate::models::{
    IntentSession, MatchRecord, MatchStatus, ProfileSnapshot, UserInterest, UserLocation,
};

pub struct LibSqlBackend {
    db: Database,
}

impl LibSqlBackend {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SessionStore for LibSqlBackend {
    async fn create_session(&self, session: &IntentSession) -> Result<()> {
        let conn = self.db.connect()?;
        SessionRepository::create(&conn, session).await
    }
    async fn get_session_by_id(&self, id: &str) -> Result<Option<IntentSession>> {
        let conn = self.db.connect()?;
        SessionRepository::get_by_id(&conn, id).await
    }
    async fn get_active_sessions_excluding(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<IntentSession>> {
        let conn = self.db.connect()?;
        SessionRepository::get_active_excluding(&conn, user_id, now).await
    }
    async fn deactivate_sessions_for_user(&self, user_id: &str) -> Result<u64> {
        let conn = self.db.connect()?;
        SessionRepository::deactivate_for_user(&conn, user_id).await
    }
    async fn deactivate_expired_sessions(&self, now: DateTime<Utc>) -> Result<u64> {
        let conn = self.db.connect()?;
        SessionRepository::deactivate_expired(&conn, now).await
    }
}

#[async_trait]
impl ProfileStore for LibSqlBackend {
    async fn get_profile(&self, user_id: &str) -> Result<Option<ProfileSnapshot>> {
        let conn = self.db.connect()?;
        ProfileRepository::get_by_user_id(&conn, user_id).await
    }
    async fn get_locations(&self, user_id: &str) -> Result<Vec<UserLocation>> {
        let conn = self.db.connect()?;
        ProfileRepository::get_locations(&conn, user_id).await
    }
    async fn get_interests(&self, user_id: &str) -> Result<Vec<UserInterest>> {
        let conn = self.db.connect()?;
        ProfileRepository::get_interests(&conn, user_id).await
    }
}

#[async_trait]
impl FriendshipStore for LibSqlBackend {
    async fn get_accepted_friend_ids(&self, user_id: &str) -> Result<Vec<String>> {
        let conn = self.db.connect()?;
        FriendshipRepository::get_accepted_friend_ids(&conn, user_id).await
    }
}

#[async_trait]
impl MatchStore for LibSqlBackend {
    async fn create_match(&self, record: &MatchRecord) -> Result<()> {
        let conn = self.db.connect()?;
        MatchRepository::create(&conn, record).await
    }
    async fn get_match_by_id(&self, id: &str) -> Result<Option<MatchRecord>> {
        let conn = self.db.connect()?;
        MatchRepository::get_by_id(&conn, id).await
    }
    async fn list_matches_for_session(&self, session_id: &str) -> Result<Vec<MatchRecord>> {
        let conn = self.db.connect()?;
        MatchRepository::list_for_session(&conn, session_id).await
    }
    async fn update_match_status(&self, id: &str, status: MatchStatus) -> Result<bool> {
        let conn = self.db.connect()?;
        MatchRepository::update_status(&conn, id, status).await
    }
}

#[async_trait]
impl DatabaseBackend for LibSqlBackend {
    async fn ping(&self) -> Result<()> {
        let conn = self.db.connect()?;
        conn.query("SELECT 1", ()).await?;
        Ok(())
    }
}
