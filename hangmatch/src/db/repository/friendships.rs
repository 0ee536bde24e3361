use libsql::{params, Connection};

use crate::error::Result;
use crate::models::FriendshipEdge;

pub struct FriendshipRepository;

impl FriendshipRepository {
    pub async fn create(conn: &Connection, edge: &FriendshipEdge) -> Result<()> {
        conn.execute(
            r#"
            INSERT INTO friendships (id, user_id, friend_id, status, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                edge.id.clone(),
                edge.user_id.clone(),
                edge.friend_id.clone(),
                edge.status.to_string(),
                edge.created_at.to_rfc3339(),
            ],
        )
        .await?;

        Ok(())
    }

    /// Accepted-friend id set for `user_id`. The edge is undirected, so the
    /// user may sit on either side of the row.
    pub async fn get_accepted_friend_ids(conn: &Connection, user_id: &str) -> Result<Vec<String>> {
        let mut rows = conn
            .query(
                "SELECT user_id, friend_id FROM friendships \
                 WHERE (user_id = ?1 OR friend_id = ?1) AND status = 'accepted'",
                params![user_id],
            )
            .await?;

        let mut friend_ids = Vec::new();
        while let Some(row) = rows.next().await? {
            let a: String = row.get(0)?;
            let b: String = row.get(1)?;
            friend_ids.push(if a == user_id { b } else { a });
        }
        Ok(friend_ids)
    }
}
