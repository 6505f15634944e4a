use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};

use crate::common::{PlayerId, SessionId};

/// Match session model - one shared swiping room for a pair of players.
///
/// The pair is stored ordered (`player_a_id < player_b_id`) so the
/// open-session unique index sees both directions as the same pair.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct MatchSession {
    pub id: SessionId,
    pub player_a_id: PlayerId,
    pub player_b_id: PlayerId,
    pub status: String,
    pub ready_a: bool,
    pub ready_b: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A session joined with the partner's username, for the active-sessions list.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SessionEntry {
    pub id: SessionId,
    pub player_a_id: PlayerId,
    pub player_b_id: PlayerId,
    pub status: String,
    pub ready_a: bool,
    pub ready_b: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub partner_id: PlayerId,
    pub partner_username: String,
}

/// Status enum for type-safe transitions
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Lobby,
    Active,
    Completed,
    Cancelled,
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionStatus::Lobby => write!(f, "lobby"),
            SessionStatus::Active => write!(f, "active"),
            SessionStatus::Completed => write!(f, "completed"),
            SessionStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::str::FromStr for SessionStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "lobby" => Ok(SessionStatus::Lobby),
            "active" => Ok(SessionStatus::Active),
            "completed" => Ok(SessionStatus::Completed),
            "cancelled" => Ok(SessionStatus::Cancelled),
            _ => Err(anyhow::anyhow!("Invalid session status: {}", s)),
        }
    }
}

impl MatchSession {
    pub fn is_participant(&self, player: PlayerId) -> bool {
        self.player_a_id == player || self.player_b_id == player
    }

    /// The other player in the session. Callers check participation first.
    pub fn partner_of(&self, player: PlayerId) -> PlayerId {
        if self.player_a_id == player {
            self.player_b_id
        } else {
            self.player_a_id
        }
    }

    pub fn ready_for(&self, player: PlayerId) -> bool {
        if self.player_a_id == player {
            self.ready_a
        } else {
            self.ready_b
        }
    }

    pub fn is_lobby(&self) -> bool {
        self.status == SessionStatus::Lobby.to_string()
    }

    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active.to_string()
    }

    pub fn is_open(&self) -> bool {
        self.is_lobby() || self.is_active()
    }
}

// =============================================================================
// SQL Queries - ALL queries must be in models/
// =============================================================================

impl MatchSession {
    /// Insert a lobby session for a pair. Races on the open-pair unique
    /// index; the caller maps the losing insert to a conflict.
    pub async fn insert(a: PlayerId, b: PlayerId, conn: &mut PgConnection) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            "INSERT INTO match_sessions (id, player_a_id, player_b_id)
             VALUES ($1, LEAST($2::uuid, $3::uuid), GREATEST($2::uuid, $3::uuid))
             RETURNING *",
        )
        .bind(SessionId::new())
        .bind(a)
        .bind(b)
        .fetch_one(conn)
        .await
        .map_err(Into::into)
    }

    /// Whether the pair already has a lobby or active session, in either
    /// order. Advisory only; the open-pair unique index is the authority.
    pub async fn open_exists_for_pair(a: PlayerId, b: PlayerId, pool: &PgPool) -> Result<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (
                 SELECT 1 FROM match_sessions
                 WHERE player_a_id = LEAST($1::uuid, $2::uuid)
                   AND player_b_id = GREATEST($1::uuid, $2::uuid)
                   AND status IN ('lobby', 'active')
             )",
        )
        .bind(a)
        .bind(b)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn find_by_id(id: SessionId, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM match_sessions WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    /// Load a session with a row lock. The session row is the mutual
    /// exclusion boundary for swipe recording; every decision transaction
    /// takes this lock first. Must run inside a transaction.
    pub async fn lock_by_id(id: SessionId, conn: &mut PgConnection) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM match_sessions WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(conn)
            .await
            .map_err(Into::into)
    }

    /// Flag a participant ready and flip `lobby -> active` in the same
    /// statement once both flags are set.
    ///
    /// A single guarded UPDATE makes concurrent ready calls commute: each
    /// sets its own flag, and exactly one of them observes both flags true
    /// while the status is still `lobby`. Returns `None` when the session is
    /// missing or no longer open; the caller refetches to tell those apart.
    pub async fn mark_ready(
        id: SessionId,
        player: PlayerId,
        pool: &PgPool,
    ) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(
            "UPDATE match_sessions
             SET ready_a = ready_a OR player_a_id = $2,
                 ready_b = ready_b OR player_b_id = $2,
                 status = CASE
                     WHEN status = 'lobby'
                          AND (ready_a OR player_a_id = $2)
                          AND (ready_b OR player_b_id = $2)
                     THEN 'active'
                     ELSE status
                 END,
                 updated_at = now()
             WHERE id = $1 AND status IN ('lobby', 'active')
             RETURNING *",
        )
        .bind(id)
        .bind(player)
        .fetch_optional(pool)
        .await
        .map_err(Into::into)
    }

    /// Move a session to a terminal status.
    pub async fn set_status(
        id: SessionId,
        status: SessionStatus,
        conn: &mut PgConnection,
    ) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            "UPDATE match_sessions
             SET status = $2, updated_at = now()
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(status.to_string())
        .fetch_one(conn)
        .await
        .map_err(Into::into)
    }

    /// Open (lobby or active) sessions for a player, newest first, with the
    /// partner's username.
    pub async fn list_open_for_player(
        player: PlayerId,
        pool: &PgPool,
    ) -> Result<Vec<SessionEntry>> {
        sqlx::query_as::<_, SessionEntry>(
            "SELECT s.*, p.id AS partner_id, p.username AS partner_username
             FROM match_sessions s
             JOIN players p
               ON p.id = CASE WHEN s.player_a_id = $1 THEN s.player_b_id ELSE s.player_a_id END
             WHERE (s.player_a_id = $1 OR s.player_b_id = $1)
               AND s.status IN ('lobby', 'active')
             ORDER BY s.created_at DESC",
        )
        .bind(player)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }
}
