use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};

use crate::common::{InvitationId, PlayerId};

/// Match invitation model - a pending handshake between two friends.
///
/// Terminal statuses (`accepted`, `rejected`, `cancelled`) are kept as
/// history; the partial unique index only constrains `pending` rows, so a
/// rejected pair can be re-invited.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Invitation {
    pub id: InvitationId,
    pub sender_id: PlayerId,
    pub receiver_id: PlayerId,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An invitation joined with the counterpart's username, for list views.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct InvitationEntry {
    pub id: InvitationId,
    pub sender_id: PlayerId,
    pub receiver_id: PlayerId,
    pub status: String,
    pub counterpart_username: String,
    pub created_at: DateTime<Utc>,
}

/// Status enum for type-safe transitions
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InvitationStatus {
    Pending,
    Accepted,
    Rejected,
    Cancelled,
}

impl std::fmt::Display for InvitationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvitationStatus::Pending => write!(f, "pending"),
            InvitationStatus::Accepted => write!(f, "accepted"),
            InvitationStatus::Rejected => write!(f, "rejected"),
            InvitationStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::str::FromStr for InvitationStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(InvitationStatus::Pending),
            "accepted" => Ok(InvitationStatus::Accepted),
            "rejected" => Ok(InvitationStatus::Rejected),
            "cancelled" => Ok(InvitationStatus::Cancelled),
            _ => Err(anyhow::anyhow!("Invalid invitation status: {}", s)),
        }
    }
}

impl Invitation {
    pub fn is_pending(&self) -> bool {
        self.status == InvitationStatus::Pending.to_string()
    }
}

// =============================================================================
// SQL Queries - ALL queries must be in models/
// =============================================================================

impl Invitation {
    /// Insert a pending invitation. Races on the pending-pair unique index;
    /// the caller maps the losing insert to a conflict.
    pub async fn insert(
        sender_id: PlayerId,
        receiver_id: PlayerId,
        pool: &PgPool,
    ) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            "INSERT INTO match_invitations (id, sender_id, receiver_id)
             VALUES ($1, $2, $3)
             RETURNING *",
        )
        .bind(InvitationId::new())
        .bind(sender_id)
        .bind(receiver_id)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    /// Load an invitation with a row lock, serializing concurrent responses
    /// to the same invitation. Must run inside a transaction.
    pub async fn lock_by_id(id: InvitationId, conn: &mut PgConnection) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM match_invitations WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(conn)
            .await
            .map_err(Into::into)
    }

    /// Move an invitation to a terminal status.
    pub async fn set_status(
        id: InvitationId,
        status: InvitationStatus,
        conn: &mut PgConnection,
    ) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            "UPDATE match_invitations
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

    /// Pending invitations sent by a player, newest first, with the
    /// receiver's username.
    pub async fn list_sent(sender_id: PlayerId, pool: &PgPool) -> Result<Vec<InvitationEntry>> {
        sqlx::query_as::<_, InvitationEntry>(
            "SELECT i.id, i.sender_id, i.receiver_id, i.status,
                    p.username AS counterpart_username, i.created_at
             FROM match_invitations i
             JOIN players p ON p.id = i.receiver_id
             WHERE i.sender_id = $1 AND i.status = 'pending'
             ORDER BY i.created_at DESC",
        )
        .bind(sender_id)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    /// Pending invitations addressed to a player, newest first, with the
    /// sender's username.
    pub async fn list_received(
        receiver_id: PlayerId,
        pool: &PgPool,
    ) -> Result<Vec<InvitationEntry>> {
        sqlx::query_as::<_, InvitationEntry>(
            "SELECT i.id, i.sender_id, i.receiver_id, i.status,
                    p.username AS counterpart_username, i.created_at
             FROM match_invitations i
             JOIN players p ON p.id = i.sender_id
             WHERE i.receiver_id = $1 AND i.status = 'pending'
             ORDER BY i.created_at DESC",
        )
        .bind(receiver_id)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }
}
