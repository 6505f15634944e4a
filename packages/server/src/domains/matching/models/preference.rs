use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgConnection;

use crate::common::{PlayerId, SessionId};

/// Preference model - one player's latest verdict on one pool item.
///
/// Re-swiping overwrites the row. A later dislike does not unseal a mutual
/// match that was already recorded; match permanence lives in
/// `mutual_matches`, not here.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Preference {
    pub session_id: SessionId,
    pub player_id: PlayerId,
    pub item_ref: String,
    pub liked: bool,
    pub decided_at: DateTime<Utc>,
}

impl Preference {
    /// Record (or overwrite) a verdict. Must run under the decision
    /// transaction's session lock.
    pub async fn upsert(
        session_id: SessionId,
        player_id: PlayerId,
        item_ref: &str,
        liked: bool,
        conn: &mut PgConnection,
    ) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            "INSERT INTO match_preferences (session_id, player_id, item_ref, liked)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (session_id, player_id, item_ref)
             DO UPDATE SET liked = EXCLUDED.liked, decided_at = now()
             RETURNING *",
        )
        .bind(session_id)
        .bind(player_id)
        .bind(item_ref)
        .bind(liked)
        .fetch_one(conn)
        .await
        .map_err(Into::into)
    }

    /// Whether the given player has liked the item. Used to detect
    /// mutuality after the partner's swipe lands.
    pub async fn has_liked(
        session_id: SessionId,
        player_id: PlayerId,
        item_ref: &str,
        conn: &mut PgConnection,
    ) -> Result<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (
                 SELECT 1 FROM match_preferences
                 WHERE session_id = $1 AND player_id = $2
                   AND item_ref = $3 AND liked = TRUE
             )",
        )
        .bind(session_id)
        .bind(player_id)
        .bind(item_ref)
        .fetch_one(conn)
        .await
        .map_err(Into::into)
    }
}
