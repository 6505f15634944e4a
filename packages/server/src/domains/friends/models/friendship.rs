use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::PlayerId;

/// Friendship model - one row per unordered pair, stored with
/// `user_a_id < user_b_id`.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Friendship {
    pub user_a_id: PlayerId,
    pub user_b_id: PlayerId,
    pub created_at: DateTime<Utc>,
}

/// A friend as shown in invite pickers: id plus display name.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct FriendEntry {
    pub friend_id: PlayerId,
    pub friend_username: String,
}

impl Friendship {
    /// Whether the two players are friends (direction-independent).
    pub async fn are_friends(a: PlayerId, b: PlayerId, pool: &PgPool) -> Result<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (
                 SELECT 1 FROM friendships
                 WHERE user_a_id = LEAST($1::uuid, $2::uuid)
                   AND user_b_id = GREATEST($1::uuid, $2::uuid)
             )",
        )
        .bind(a)
        .bind(b)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    /// All friends of a player, with usernames, alphabetical.
    pub async fn list_for_user(user: PlayerId, pool: &PgPool) -> Result<Vec<FriendEntry>> {
        sqlx::query_as::<_, FriendEntry>(
            "SELECT p.id AS friend_id, p.username AS friend_username
             FROM friendships f
             JOIN players p
               ON p.id = CASE WHEN f.user_a_id = $1 THEN f.user_b_id ELSE f.user_a_id END
             WHERE f.user_a_id = $1 OR f.user_b_id = $1
             ORDER BY p.username",
        )
        .bind(user)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    /// Record a friendship. Owned by the directory collaborator in production;
    /// used by fixtures here.
    pub async fn insert(a: PlayerId, b: PlayerId, pool: &PgPool) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            "INSERT INTO friendships (user_a_id, user_b_id)
             VALUES (LEAST($1::uuid, $2::uuid), GREATEST($1::uuid, $2::uuid))
             RETURNING *",
        )
        .bind(a)
        .bind(b)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }
}
