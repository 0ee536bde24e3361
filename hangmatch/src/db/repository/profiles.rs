use chrono::{DateTime, Utc};
use libsql::{params, Connection};

use crate::error::Result;
use crate::models::{ProfileSnapshot, UserInterest, UserLocation};

pub struct ProfileRepository;

impl ProfileRepository {
    pub async fn create(conn: &Connection, profile: &ProfileSnapshot) -> Result<()> {
        conn.execute(
            r#"
            INSERT INTO profiles (
                user_id, display_name, home_neighborhood, preferred_neighborhoods,
                train_routes, trust_score, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                profile.user_id.clone(),
                profile.display_name.clone(),
                profile.home_neighborhood.clone(),
                serde_json::to_string(&profile.preferred_neighborhoods)?,
                serde_json::to_string(&profile.train_routes)?,
                profile.trust_score,
                profile.created_at.to_rfc3339(),
                profile.updated_at.to_rfc3339(),
            ],
        )
        .await?;

        Ok(())
    }

    pub async fn get_by_user_id(conn: &Connection, user_id: &str) -> Result<Option<ProfileSnapshot>> {
        let mut rows = conn
            .query(
                "SELECT user_id, display_name, home_neighborhood, preferred_neighborhoods, \
                        train_routes, trust_score, created_at, updated_at \
                 FROM profiles WHERE user_id = ?1",
                params![user_id],
            )
            .await?;

        if let Some(row) = rows.next().await? {
            Ok(Some(Self::row_to_profile(&row)?))
        } else {
            Ok(None)
        }
    }

    pub async fn add_location(conn: &Connection, location: &UserLocation) -> Result<()> {
        conn.execute(
            r#"
            INSERT INTO user_locations (id, user_id, label, location_type, neighborhood, borough, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                location.id.clone(),
                location.user_id.clone(),
                location.label.clone(),
                location.location_type.clone(),
                location.neighborhood.clone(),
                location.borough.clone(),
                location.created_at.to_rfc3339(),
            ],
        )
        .await?;

        Ok(())
    }

    pub async fn get_locations(conn: &Connection, user_id: &str) -> Result<Vec<UserLocation>> {
        let mut rows = conn
            .query(
                "SELECT id, user_id, label, location_type, neighborhood, borough, created_at \
                 FROM user_locations WHERE user_id = ?1",
                params![user_id],
            )
            .await?;

        let mut locations = Vec::new();
        while let Some(row) = rows.next().await? {
            locations.push(UserLocation {
                id: row.get(0)?,
                user_id: row.get(1)?,
                label: row.get(2)?,
                location_type: row.get(3)?,
                neighborhood: row.get(4)?,
                borough: row.get(5)?,
                created_at: parse_timestamp(&row.get::<String>(6)?),
            });
        }
        Ok(locations)
    }

    pub async fn add_interest(conn: &Connection, interest: &UserInterest) -> Result<()> {
        conn.execute(
            r#"
            INSERT INTO user_interests (id, user_id, interest, interest_type, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                interest.id.clone(),
                interest.user_id.clone(),
                interest.interest.clone(),
                interest.interest_type.clone(),
                interest.created_at.to_rfc3339(),
            ],
        )
        .await?;

        Ok(())
    }

    pub async fn get_interests(conn: &Connection, user_id: &str) -> Result<Vec<UserInterest>> {
        let mut rows = conn
            .query(
                "SELECT id, user_id, interest, interest_type, created_at \
                 FROM user_interests WHERE user_id = ?1",
                params![user_id],
            )
            .await?;

        let mut interests = Vec::new();
        while let Some(row) = rows.next().await? {
            interests.push(UserInterest {
                id: row.get(0)?,
                user_id: row.get(1)?,
                interest: row.get(2)?,
                interest_type: row.get(3)?,
                created_at: parse_timestamp(&row.get::<String>(4)?),
            });
        }
        Ok(interests)
    }

    pub fn row_to_profile(row: &libsql::Row) -> Result<ProfileSnapshot> {
        Ok(ProfileSnapshot {
            user_id: row.get(0)?,
            display_name: row.get(1)?,
            home_neighborhood: row.get(2)?,
            preferred_neighborhoods: serde_json::from_str(&row.get::<String>(3)?)
                .unwrap_or_default(),
            train_routes: serde_json::from_str(&row.get::<String>(4)?).unwrap_or_default(),
            trust_score: row.get(5)?,
            created_at: parse_timestamp(&row.get::<String>(6)?),
            updated_at: parse_timestamp(&row.get::<String>(7)?),
        })
    }
}

fn parse_timestamp(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
