use libsql::Connection;

use crate::error::Result;

pub async fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- Profiles (written by the external intake collaborator)
        CREATE TABLE IF NOT EXISTS profiles (
            user_id TEXT PRIMARY KEY,
            display_name TEXT,
            home_neighborhood TEXT,
            preferred_neighborhoods TEXT DEFAULT '[]',
            train_routes TEXT DEFAULT '[]',
            trust_score INTEGER NOT NULL DEFAULT 10,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        -- Registered frequent locations
        CREATE TABLE IF NOT EXISTS user_locations (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            label TEXT,
            location_type TEXT NOT NULL DEFAULT 'other',
            neighborhood TEXT NOT NULL,
            borough TEXT,
            created_at TEXT NOT NULL,
            FOREIGN KEY (user_id) REFERENCES profiles(user_id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_user_locations_user_id ON user_locations(user_id);

        -- Interest tags
        CREATE TABLE IF NOT EXISTS user_interests (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            interest TEXT NOT NULL,
            interest_type TEXT NOT NULL DEFAULT 'hobby',
            created_at TEXT NOT NULL,
            FOREIGN KEY (user_id) REFERENCES profiles(user_id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_user_interests_user_id ON user_interests(user_id);

        -- Friendships (undirected; only accepted edges matter to scoring)
        CREATE TABLE IF NOT EXISTS friendships (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            friend_id TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'pending',
            created_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_friendships_user_id ON friendships(user_id);
        CREATE INDEX IF NOT EXISTS idx_friendships_friend_id ON friendships(friend_id);

        -- Intent sessions (48h lifecycle)
        CREATE TABLE IF NOT EXISTS intent_sessions (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            mood TEXT NOT NULL,
            energy_level INTEGER NOT NULL DEFAULT 5,
            activity_types TEXT DEFAULT '[]',
            time_windows TEXT DEFAULT '[]',
            wants_to_do TEXT,
            does_not_want TEXT,
            emotional_intent_metadata TEXT DEFAULT 'null',
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL,
            expires_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_intent_sessions_user_id ON intent_sessions(user_id);
        -- Compound index for the candidate pool query
        -- (is_active=1 AND expires_at >= now AND user_id != requester)
        CREATE INDEX IF NOT EXISTS idx_intent_sessions_active_expiry
            ON intent_sessions(is_active, expires_at);

        -- Match records produced by the engine
        CREATE TABLE IF NOT EXISTS matches (
            id TEXT PRIMARY KEY,
            session_id TEXT NOT NULL,
            user_id TEXT NOT NULL,
            matched_user_id TEXT NOT NULL,
            matched_session_id TEXT NOT NULL,
            match_score INTEGER NOT NULL,
            score_breakdown TEXT NOT NULL DEFAULT '{}',
            suggested_venues TEXT NOT NULL DEFAULT '[]',
            status TEXT NOT NULL DEFAULT 'suggested',
            created_at TEXT NOT NULL,
            FOREIGN KEY (session_id) REFERENCES intent_sessions(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_matches_session_id ON matches(session_id);
        CREATE INDEX IF NOT EXISTS idx_matches_user_id ON matches(user_id);
        "#,
    )
    .await?;

    Ok(())
}
