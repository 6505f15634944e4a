use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::PlayerId;

/// Player model - identity row owned by the user directory.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Player {
    pub id: PlayerId,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

impl Player {
    /// Insert a player row. The directory collaborator normally owns writes;
    /// this exists for fixtures and local development seeding.
    pub async fn insert(username: &str, pool: &PgPool) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            "INSERT INTO players (id, username) VALUES ($1, $2) RETURNING *",
        )
        .bind(PlayerId::new())
        .bind(username)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }
}
