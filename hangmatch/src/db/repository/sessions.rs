use chrono::{DateTime, Utc};
use libsql::{params, Connection};

use crate::error::Result;
use crate::models::IntentSession;

const SESSION_COLUMNS: &str = "id, user_id, mood, energy_level, activity_types, time_windows, \
     wants_to_do, does_not_want, emotional_intent_metadata, is_active, created_at, expires_at";

pub struct SessionRepository;

impl SessionRepository {
    pub async fn create(conn: &Connection, session: &IntentSession) -> Result<()> {
        conn.execute(
            r#"
            INSERT INTO intent_sessions (
                id, user_id, mood, energy_level, activity_types, time_windows,
                wants_to_do, does_not_want, emotional_intent_metadata,
                is_active, created_at, expires_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12
            )
            "#,
            params![
                session.id.clone(),
                session.user_id.clone(),
                session.mood.clone(),
                session.energy_level,
                serde_json::to_string(&session.activity_types)?,
                serde_json::to_string(&session.time_windows)?,
                session.wants_to_do.clone(),
                session.does_not_want.clone(),
                serde_json::to_string(&session.emotional_intent_metadata)?,
                session.is_active as i32,
                session.created_at.to_rfc3339(),
                session.expires_at.to_rfc3339(),
            ],
        )
        .await?;

        Ok(())
    }

    pub async fn get_by_id(conn: &Connection, id: &str) -> Result<Option<IntentSession>> {
        let mut rows = conn
            .query(
                &format!("SELECT {SESSION_COLUMNS} FROM intent_sessions WHERE id = ?1"),
                params![id],
            )
            .await?;

        if let Some(row) = rows.next().await? {
            Ok(Some(Self::row_to_session(&row)?))
        } else {
            Ok(None)
        }
    }

    pub async fn get_active_excluding(
        conn: &Connection,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<IntentSession>> {
        let mut rows = conn
            .query(
                &format!(
                    "SELECT {SESSION_COLUMNS} FROM intent_sessions \
                     WHERE user_id != ?1 AND is_active = 1 AND expires_at >= ?2 \
                     ORDER BY created_at ASC"
                ),
                params![user_id, now.to_rfc3339()],
            )
            .await?;

        let mut sessions = Vec::new();
        while let Some(row) = rows.next().await? {
            sessions.push(Self::row_to_session(&row)?);
        }
        Ok(sessions)
    }

    pub async fn deactivate_for_user(conn: &Connection, user_id: &str) -> Result<u64> {
        let affected = conn
            .execute(
                "UPDATE intent_sessions SET is_active = 0 WHERE user_id = ?1 AND is_active = 1",
                params![user_id],
            )
            .await?;
        Ok(affected)
    }

    pub async fn deactivate_expired(conn: &Connection, now: DateTime<Utc>) -> Result<u64> {
        let affected = conn
            .execute(
                "UPDATE intent_sessions SET is_active = 0 WHERE is_active = 1 AND expires_at < ?1",
                params![now.to_rfc3339()],
            )
            .await?;
        Ok(affected)
    }

    pub fn row_to_session(row: &libsql::Row) -> Result<IntentSession> {
        Ok(IntentSession {
            id: row.get(0)?,
            user_id: row.get(1)?,
            mood: row.get(2)?,
            energy_level: row.get(3)?,
            activity_types: serde_json::from_str(&row.get::<String>(4)?).unwrap_or_default(),
            time_windows: serde_json::from_str(&row.get::<String>(5)?).unwrap_or_default(),
            wants_to_do: row.get(6)?,
            does_not_want: row.get(7)?,
            emotional_intent_metadata: serde_json::from_str(&row.get::<String>(8)?)
                .unwrap_or(serde_json::Value::Null),
            is_active: row.get::<i32>(9)? != 0,
            created_at: DateTime::parse_from_rfc3339(&row.get::<String>(10)?)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
            expires_at: DateTime::parse_from_rfc3339(&row.get::<String>(11)?)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
        })
    }
}
