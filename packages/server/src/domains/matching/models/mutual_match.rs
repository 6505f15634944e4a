use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};

use crate::common::SessionId;

/// Mutual match model - the permanent record that both players liked an
/// item. Rows are never updated or deleted while the session exists; a
/// later dislike does not retract one.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct MutualMatch {
    pub session_id: SessionId,
    pub item_ref: String,
    pub matched_at: DateTime<Utc>,
}

impl MutualMatch {
    /// Seal a mutual match, exactly once per (session, item). Returns `None`
    /// when another transaction already sealed it; the losing insert is not
    /// an error. Must run under the decision transaction's session lock.
    pub async fn insert_if_absent(
        session_id: SessionId,
        item_ref: &str,
        conn: &mut PgConnection,
    ) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(
            "INSERT INTO mutual_matches (session_id, item_ref)
             VALUES ($1, $2)
             ON CONFLICT DO NOTHING
             RETURNING *",
        )
        .bind(session_id)
        .bind(item_ref)
        .fetch_optional(conn)
        .await
        .map_err(Into::into)
    }

    /// All matches for a session in the order they were sealed.
    pub async fn list_for_session(session_id: SessionId, pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM mutual_matches
             WHERE session_id = $1
             ORDER BY matched_at, item_ref",
        )
        .bind(session_id)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }
}
