use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};

use crate::common::{PlayerId, SessionId};

/// Pool item model - one candidate in a session's shared pool.
///
/// `item_ref` is an opaque reference into the external title catalog; the
/// engine never interprets it. The pool is a set: the composite primary key
/// deduplicates contributions, and `contributed_by` records whoever got the
/// item in first.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PoolItem {
    pub session_id: SessionId,
    pub item_ref: String,
    pub contributed_by: PlayerId,
    pub created_at: DateTime<Utc>,
}

impl PoolItem {
    /// Union a batch of item refs into the pool. Duplicates (within the
    /// batch or against existing rows) are silently dropped; returns how
    /// many rows were actually new.
    pub async fn contribute(
        session_id: SessionId,
        contributed_by: PlayerId,
        item_refs: &[String],
        conn: &mut PgConnection,
    ) -> Result<u64> {
        let result = sqlx::query(
            "INSERT INTO match_pool_items (session_id, item_ref, contributed_by)
             SELECT $1::uuid, r, $2::uuid FROM UNNEST($3::text[]) AS r
             ON CONFLICT DO NOTHING",
        )
        .bind(session_id)
        .bind(contributed_by)
        .bind(item_refs)
        .execute(conn)
        .await?;
        Ok(result.rows_affected())
    }

    /// Whether an item is in the session's pool. Must run under the
    /// decision transaction's session lock.
    pub async fn exists(
        session_id: SessionId,
        item_ref: &str,
        conn: &mut PgConnection,
    ) -> Result<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (
                 SELECT 1 FROM match_pool_items
                 WHERE session_id = $1 AND item_ref = $2
             )",
        )
        .bind(session_id)
        .bind(item_ref)
        .fetch_one(conn)
        .await
        .map_err(Into::into)
    }

    /// Pool items the player has not yet decided on, oldest contribution
    /// first so both players walk the pool in the same order.
    pub async fn list_undecided_for_player(
        session_id: SessionId,
        player: PlayerId,
        pool: &PgPool,
    ) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT i.* FROM match_pool_items i
             WHERE i.session_id = $1
               AND NOT EXISTS (
                   SELECT 1 FROM match_preferences p
                   WHERE p.session_id = i.session_id
                     AND p.player_id = $2
                     AND p.item_ref = i.item_ref
               )
             ORDER BY i.created_at, i.item_ref",
        )
        .bind(session_id)
        .bind(player)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn count_for_session(session_id: SessionId, conn: &mut PgConnection) -> Result<i64> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM match_pool_items WHERE session_id = $1",
        )
        .bind(session_id)
        .fetch_one(conn)
        .await
        .map_err(Into::into)
    }
}
