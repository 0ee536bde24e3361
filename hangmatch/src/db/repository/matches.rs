use chrono::{DateTime, Utc};
use libsql::{params, Connection};

use crate::error::Result;
use crate::models::{MatchRecord, MatchStatus, ScoreBreakdown};

const MATCH_COLUMNS: &str = "id, session_id, user_id, matched_user_id, matched_session_id, \
     match_score, score_breakdown, suggested_venues, status, created_at";

pub struct MatchRepository;

impl MatchRepository {
    pub async fn create(conn: &Connection, record: &MatchRecord) -> Result<()> {
        conn.execute(
            r#"
            INSERT INTO matches (
                id, session_id, user_id, matched_user_id, matched_session_id,
                match_score, score_breakdown, suggested_venues, status, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                record.id.clone(),
                record.session_id.clone(),
                record.user_id.clone(),
                record.matched_user_id.clone(),
                record.matched_session_id.clone(),
                record.match_score,
                serde_json::to_string(&record.score_breakdown)?,
                serde_json::to_string(&record.suggested_venues)?,
                record.status.to_string(),
                record.created_at.to_rfc3339(),
            ],
        )
        .await?;

        Ok(())
    }

    pub async fn get_by_id(conn: &Connection, id: &str) -> Result<Option<MatchRecord>> {
        let mut rows = conn
            .query(
                &format!("SELECT {MATCH_COLUMNS} FROM matches WHERE id = ?1"),
                params![id],
            )
            .await?;

        if let Some(row) = rows.next().await? {
            Ok(Some(Self::row_to_match(&row)?))
        } else {
            Ok(None)
        }
    }

    pub async fn list_for_session(conn: &Connection, session_id: &str) -> Result<Vec<MatchRecord>> {
        let mut rows = conn
            .query(
                &format!(
                    "SELECT {MATCH_COLUMNS} FROM matches \
                     WHERE session_id = ?1 ORDER BY match_score DESC, matched_user_id ASC"
                ),
                params![session_id],
            )
            .await?;

        let mut records = Vec::new();
        while let Some(row) = rows.next().await? {
            records.push(Self::row_to_match(&row)?);
        }
        Ok(records)
    }

    /// Returns false when no row with the given id exists.
    pub async fn update_status(conn: &Connection, id: &str, status: MatchStatus) -> Result<bool> {
        let affected = conn
            .execute(
                "UPDATE matches SET status = ?1 WHERE id = ?2",
                params![status.to_string(), id],
            )
            .await?;
        Ok(affected > 0)
    }

    pub fn row_to_match(row: &libsql::Row) -> Result<MatchRecord> {
        let status: String = row.get(8)?;
        Ok(MatchRecord {
            id: row.get(0)?,
            session_id: row.get(1)?,
            user_id: row.get(2)?,
            matched_user_id: row.get(3)?,
            matched_session_id: row.get(4)?,
            match_score: row.get(5)?,
            score_breakdown: serde_json::from_str(&row.get::<String>(6)?).unwrap_or(
                ScoreBreakdown {
                    location: 0,
                    mood: 0,
                    time: 0,
                    activity: 0,
                    friend: 0,
                },
            ),
            suggested_venues: serde_json::from_str(&row.get::<String>(7)?).unwrap_or_default(),
            status: status.parse().unwrap_or(MatchStatus::Suggested),
            created_at: DateTime::parse_from_rfc3339(&row.get::<String>(9)?)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
        })
    }
}
